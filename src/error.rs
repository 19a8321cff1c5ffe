//! Runtime error types for the tape VM

use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::parser::CompileError;

/// Result type for VM operations
pub type VmResult<T> = Result<T, VmError>;

/// Which edge of a range a failed write tried to cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Below the lower edge (pointer < 0 or cell < 0)
    Underflow,
    /// Above the upper edge (pointer >= capacity or cell > 255)
    Overflow,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Underflow => write!(f, "underflow"),
            Bound::Overflow => write!(f, "overflow"),
        }
    }
}

/// What kind of write produced a cell overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellWrite {
    /// `+` or `-`
    Arithmetic,
    /// `,` storing a queued input value
    Input,
}

/// Errors raised while executing a program
///
/// Overflow errors abort the instruction in progress. The tape and pointer
/// stay exactly as they were after the last successful instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Pointer left `[0, capacity - 1]` under the error pointer policy
    #[error("{}", pointer_overflow_message(.bound, .attempted, .max))]
    PointerOverflow {
        bound: Bound,
        attempted: i64,
        max: usize,
    },

    /// Cell left `[0, 255]` under the error cell policy
    #[error("{}", cell_overflow_message(.bound, .cell, .value, .write))]
    CellOverflow {
        bound: Bound,
        cell: usize,
        value: i64,
        write: CellWrite,
    },

    /// Single-step bracket scan ran off either end of the program text
    #[error("Unmatched '{bracket}' found at position {position}.")]
    UnmatchedBracket { bracket: char, position: usize },

    /// Program failed to compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Invalid machine configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl VmError {
    /// True for errors raised by the error pointer policy
    pub fn is_pointer_overflow(&self) -> bool {
        matches!(self, VmError::PointerOverflow { .. })
    }

    /// True for errors raised by the error cell policy
    pub fn is_cell_overflow(&self) -> bool {
        matches!(self, VmError::CellOverflow { .. })
    }
}

fn pointer_overflow_message(bound: &Bound, attempted: &i64, max: &usize) -> String {
    match bound {
        Bound::Underflow => format!("Pointer underflow: attempted to move to {}", attempted),
        Bound::Overflow => format!(
            "Pointer overflow: attempted to move to {} (max: {})",
            attempted, max
        ),
    }
}

fn cell_overflow_message(bound: &Bound, cell: &usize, value: &i64, write: &CellWrite) -> String {
    match write {
        CellWrite::Arithmetic => {
            format!("Cell {}: attempted to set cell {} to {}", bound, cell, value)
        }
        CellWrite::Input => format!("Input value {} out of range (0-255)", value),
    }
}
