//! Program text front end
//!
//! Validates raw program text and compiles it into VM instructions.

pub mod compiler;
pub mod error;
pub mod syntax;

#[cfg(test)]
mod tests;

pub use compiler::Compiler;
pub use error::{CompileError, CompileResult};
pub use syntax::{check_syntax, render_violations, Position, SyntaxViolation};

use crate::program::CompiledProgram;

/// Validate and compile program text
pub fn compile(source: &str) -> CompileResult<CompiledProgram> {
    Compiler::new().compile(source)
}
