//! Error types for the compiler

use thiserror::Error;

use super::syntax::SyntaxViolation;

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation failure. No bytecode is produced when any of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Program contains characters outside the operator alphabet
    #[error("Syntax errors found: {}", format_violations(.0))]
    Syntax(Vec<SyntaxViolation>),

    /// A `[` with no matching `]`
    #[error("Unmatched '[' found at position {position}.")]
    UnmatchedOpen { position: usize },

    /// A `]` with no preceding unmatched `[`
    #[error("Unmatched ']' found at position {position}.")]
    UnmatchedClose { position: usize },

    /// Compilation was requested with no program loaded
    #[error("No program loaded to compile.")]
    EmptyProgram,
}

impl CompileError {
    /// Character position the error points at, if it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            CompileError::Syntax(violations) => violations.first().map(|v| v.position),
            CompileError::UnmatchedOpen { position } | CompileError::UnmatchedClose { position } => {
                Some(*position)
            }
            CompileError::EmptyProgram => None,
        }
    }
}

fn format_violations(violations: &[SyntaxViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message_lists_every_violation() {
        let err = CompileError::Syntax(vec![
            SyntaxViolation { position: 0, character: 'a' },
            SyntaxViolation { position: 4, character: '!' },
        ]);
        assert_eq!(err.to_string(), "Syntax errors found: (0, 'a') (4, '!')");
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn test_bracket_messages() {
        assert_eq!(
            CompileError::UnmatchedOpen { position: 1 }.to_string(),
            "Unmatched '[' found at position 1."
        );
        assert_eq!(CompileError::UnmatchedClose { position: 7 }.position(), Some(7));
        assert_eq!(CompileError::EmptyProgram.position(), None);
    }
}
