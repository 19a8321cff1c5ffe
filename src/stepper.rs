//! Single-step interpreter over raw program text
//!
//! One character per call. Loop tests have no precomputed targets: a taken
//! branch scans the text bracket by bracket until the nesting depth returns
//! to zero. This is the slow path hosts use to inspect every transition.

use crate::error::{VmError, VmResult};
use crate::executor::apply;
use crate::io::Io;
use crate::opcodes::Op;
use crate::tape::Tape;

pub struct Stepper<'a> {
    text: &'a [char],
    tape: &'a mut Tape,
    io: &'a mut Io,
}

impl<'a> Stepper<'a> {
    pub fn new(text: &'a [char], tape: &'a mut Tape, io: &'a mut Io) -> Self {
        Stepper { text, tape, io }
    }

    /// Execute the character at `pc` and return the position of the next one
    ///
    /// Characters outside the operator alphabet are skipped. On error nothing
    /// has changed and the caller's pc should stay where it is.
    pub fn step_at(&mut self, pc: usize) -> VmResult<usize> {
        let Some(op) = self.text.get(pc).copied().and_then(Op::from_char) else {
            return Ok(pc + 1);
        };

        match op {
            Op::LoopStart if self.tape.current() == 0 => Ok(self.matching_close(pc)? + 1),
            Op::LoopEnd if self.tape.current() != 0 => Ok(self.matching_open(pc)? + 1),
            op => {
                apply(self.tape, self.io, op, 1)?;
                Ok(pc + 1)
            }
        }
    }

    /// Scan forward from the `[` at `pc` to its `]`
    fn matching_close(&self, pc: usize) -> VmResult<usize> {
        let mut depth = 1;
        let mut i = pc;
        while depth > 0 {
            i += 1;
            match self.text.get(i) {
                None => {
                    return Err(VmError::UnmatchedBracket {
                        bracket: '[',
                        position: pc,
                    });
                }
                Some('[') => depth += 1,
                Some(']') => depth -= 1,
                Some(_) => {}
            }
        }
        Ok(i)
    }

    /// Scan backward from the `]` at `pc` to its `[`
    fn matching_open(&self, pc: usize) -> VmResult<usize> {
        let mut depth = 1;
        let mut i = pc;
        while depth > 0 {
            if i == 0 {
                return Err(VmError::UnmatchedBracket {
                    bracket: ']',
                    position: pc,
                });
            }
            i -= 1;
            match self.text[i] {
                ']' => depth += 1,
                '[' => depth -= 1,
                _ => {}
            }
        }
        Ok(i)
    }
}
