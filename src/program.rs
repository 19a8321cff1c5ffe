use std::fmt;

use crate::opcodes::{Instruction, Op};

/// A compiled program ready for the fast executors
///
/// Jump targets are resolved: every `[` points at its `]` and every `]` at
/// its `[`. The instruction list is immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledProgram {
    instructions: Vec<Instruction>,
}

impl CompiledProgram {
    /// Wrap an instruction list produced by the compiler
    pub(crate) fn new(instructions: Vec<Instruction>) -> Self {
        CompiledProgram { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Optimization statistics relative to the text this was compiled from
    pub fn stats(&self, source: &str) -> CompileStats {
        let original_ops = source.chars().filter(|c| Op::from_char(*c).is_some()).count();
        let ops_saved = self
            .instructions
            .iter()
            .filter(|i| i.op.is_mergeable() && i.operand > 1)
            .map(|i| i.operand - 1)
            .sum();

        CompileStats {
            original_ops,
            compiled_ops: self.instructions.len(),
            ops_saved,
        }
    }

    /// One line per instruction: index, operator, and operand where it carries one
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (i, instr) in self.instructions.iter().enumerate() {
            match instr.op {
                Op::Output | Op::Input => {
                    out.push_str(&format!("{:>3}: {}\n", i, instr.op.as_char()))
                }
                _ => out.push_str(&format!(
                    "{:>3}: {} {}\n",
                    i,
                    instr.op.as_char(),
                    instr.operand
                )),
            }
        }
        out
    }
}

/// How much the run-length merge shrank a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileStats {
    /// Operator characters in the source
    pub original_ops: usize,
    /// Instructions after compilation
    pub compiled_ops: usize,
    /// Sum of (run length - 1) over merged instructions
    pub ops_saved: usize,
}

impl CompileStats {
    /// Saved operations as a percentage of the original count
    pub fn efficiency(&self) -> f64 {
        if self.original_ops == 0 {
            0.0
        } else {
            self.ops_saved as f64 * 100.0 / self.original_ops as f64
        }
    }
}

impl fmt::Display for CompileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original operations: {}", self.original_ops)?;
        writeln!(f, "Compiled operations: {}", self.compiled_ops)?;
        writeln!(f, "Operations saved by optimization: {}", self.ops_saved)?;
        write!(f, "Efficiency improvement: {:.1}%", self.efficiency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn test_stats() {
        let program = parser::compile("+++>>").unwrap();
        let stats = program.stats("+++>>");
        assert_eq!(stats.original_ops, 5);
        assert_eq!(stats.compiled_ops, 2);
        assert_eq!(stats.ops_saved, 3);
        assert!((stats.efficiency() - 60.0).abs() < 1e-9);
        assert!(stats.to_string().ends_with("Efficiency improvement: 60.0%"));
    }

    #[test]
    fn test_stats_empty() {
        let program = parser::compile("").unwrap();
        assert_eq!(program.stats("").efficiency(), 0.0);
    }

    #[test]
    fn test_listing() {
        let program = parser::compile("++[.]").unwrap();
        assert_eq!(program.listing(), "  0: + 2\n  1: [ 3\n  2: .\n  3: ] 1\n");
    }
}
