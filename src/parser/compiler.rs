//! Compiler that converts program text to VM instructions

use super::error::{CompileError, CompileResult};
use super::syntax::check_syntax;
use crate::opcodes::{Instruction, Op, UNRESOLVED};
use crate::program::CompiledProgram;
use tracing::debug;

/// Compiler that translates program text into a flat instruction list
///
/// Runs of `> < + -` are merged into one instruction carrying the run
/// length. Loop instructions get their jump targets resolved in the same
/// pass by back-patching.
pub struct Compiler {
    /// Instructions emitted so far
    instructions: Vec<Instruction>,

    /// Pending `[` instructions: (instruction index, character position)
    open_loops: Vec<(usize, usize)>,
}

impl Compiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Compiler {
            instructions: Vec::new(),
            open_loops: Vec::new(),
        }
    }

    /// Compile program text into instructions
    ///
    /// Fails before emitting anything if the text contains characters outside
    /// the operator alphabet. Fails with no partial output on unbalanced
    /// brackets.
    pub fn compile(&mut self, source: &str) -> CompileResult<CompiledProgram> {
        let violations = check_syntax(source);
        if !violations.is_empty() {
            return Err(CompileError::Syntax(violations));
        }

        self.instructions.clear();
        self.open_loops.clear();

        let chars: Vec<char> = source.chars().collect();
        let mut pc = 0;

        while pc < chars.len() {
            // Validated above, every character is an operator
            let Some(op) = Op::from_char(chars[pc]) else {
                pc += 1;
                continue;
            };

            match op {
                Op::LoopStart => {
                    self.open_loops.push((self.instructions.len(), pc));
                    self.emit(op, UNRESOLVED);
                }

                Op::LoopEnd => {
                    let (start, _) = self
                        .open_loops
                        .pop()
                        .ok_or(CompileError::UnmatchedClose { position: pc })?;
                    let end = self.instructions.len();
                    self.emit(op, start);
                    self.instructions[start].operand = end;
                }

                Op::Right | Op::Left | Op::Inc | Op::Dec => {
                    let mut count = 1;
                    while pc + 1 < chars.len() && chars[pc + 1] == chars[pc] {
                        count += 1;
                        pc += 1;
                    }
                    self.emit(op, count);
                }

                Op::Output | Op::Input => self.emit(op, 0),
            }

            pc += 1;
        }

        if let Some(&(_, position)) = self.open_loops.last() {
            self.instructions.clear();
            return Err(CompileError::UnmatchedOpen { position });
        }

        let instructions = std::mem::take(&mut self.instructions);
        debug!(
            source_len = chars.len(),
            instructions = instructions.len(),
            "compiled program"
        );
        Ok(CompiledProgram::new(instructions))
    }

    fn emit(&mut self, op: Op, operand: usize) {
        self.instructions.push(Instruction::new(op, operand));
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
