use crate::error::VmResult;
use crate::io::Io;
use crate::opcodes::{Instruction, Op};
use crate::tape::Tape;

/// Position of a compiled-program run
///
/// The bulk runner uses a fresh cursor per call. The chunked runner keeps
/// one on the machine so a run can continue across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Index of the next instruction
    pub pc: usize,

    /// Instructions executed since the run started
    pub steps: usize,
}

/// Apply one non-jump operator `magnitude` times
///
/// Shared by every engine. Jumps are handled by the callers because each
/// engine resolves them differently.
pub(crate) fn apply(tape: &mut Tape, io: &mut Io, op: Op, magnitude: i64) -> VmResult<()> {
    match op {
        Op::Right => tape.move_pointer(magnitude),
        Op::Left => tape.move_pointer(-magnitude),
        Op::Inc => tape.modify_cell(magnitude),
        Op::Dec => tape.modify_cell(-magnitude),
        Op::Output => {
            io.write(tape.output_byte());
            Ok(())
        }
        Op::Input => match io.read() {
            Some(value) => tape.store_input(value),
            None => tape.store_input(0),
        },
        // Loop tests never mutate state
        Op::LoopStart | Op::LoopEnd => Ok(()),
    }
}

/// Executor for compiled programs
///
/// Jumps use the targets resolved at compile time, so every instruction,
/// loop tests included, is O(1).
pub struct Executor<'a> {
    /// Compiled instructions
    instructions: &'a [Instruction],

    /// Memory tape and pointer
    tape: &'a mut Tape,

    /// Input queue and output log
    io: &'a mut Io,
}

impl<'a> Executor<'a> {
    /// Create a new executor
    pub fn new(instructions: &'a [Instruction], tape: &'a mut Tape, io: &'a mut Io) -> Self {
        Executor {
            instructions,
            tape,
            io,
        }
    }

    /// Execute from `cursor` until the program ends, `limit` instructions
    /// have run in this call, or the cursor reaches `max_steps`
    ///
    /// Returns the number of instructions executed in this call. On error the
    /// cursor still points at the failing instruction.
    pub fn advance(&mut self, cursor: &mut Cursor, limit: usize, max_steps: usize) -> VmResult<usize> {
        let mut executed = 0;

        while cursor.pc < self.instructions.len() && executed < limit && cursor.steps < max_steps {
            cursor.pc = self.execute_at(cursor.pc)?;
            cursor.steps += 1;
            executed += 1;
        }

        Ok(executed)
    }

    /// True once the cursor has run off the end of the program
    pub fn is_finished(&self, cursor: &Cursor) -> bool {
        cursor.pc >= self.instructions.len()
    }

    /// Execute the instruction at `pc` and return the next pc
    #[inline]
    fn execute_at(&mut self, pc: usize) -> VmResult<usize> {
        let instr = self.instructions[pc];

        match instr.op {
            Op::LoopStart if self.tape.current() == 0 => Ok(instr.operand + 1),
            Op::LoopEnd if self.tape.current() != 0 => Ok(instr.operand + 1),
            op => {
                apply(self.tape, self.io, op, instr.operand as i64)?;
                Ok(pc + 1)
            }
        }
    }
}
