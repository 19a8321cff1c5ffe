//! Syntax validator
//!
//! Reports every character outside the eight-operator alphabet. Never fails
//! and never stops early. Bracket balance is the compiler's job.

use std::fmt;

use crate::opcodes::Op;

/// Line and column of a character in program text (both 1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// Zero-based character index
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A character that is not one of the eight operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxViolation {
    /// Zero-based character index in the program text
    pub position: usize,
    pub character: char,
}

impl SyntaxViolation {
    /// Resolve the violation to a line and column in `source`
    pub fn location(&self, source: &str) -> Position {
        let mut line = 1;
        let mut column = 1;
        for c in source.chars().take(self.position) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position {
            line,
            column,
            offset: self.position,
        }
    }
}

impl fmt::Display for SyntaxViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {:?})", self.position, self.character)
    }
}

/// Scan `program` and collect every illegal character with its position
pub fn check_syntax(program: &str) -> Vec<SyntaxViolation> {
    program
        .chars()
        .enumerate()
        .filter(|(_, c)| Op::from_char(*c).is_none())
        .map(|(position, character)| SyntaxViolation {
            position,
            character,
        })
        .collect()
}

/// Render violations with a source excerpt and caret, one block per violation
pub fn render_violations(violations: &[SyntaxViolation], source: &str, filename: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut output = String::new();

    for violation in violations {
        let pos = violation.location(source);
        output.push_str(&format!(
            "Error: unexpected character {:?}\n",
            violation.character
        ));
        output.push_str(&format!("  --> {}:{}:{}\n", filename, pos.line, pos.column));

        if let Some(line) = lines.get(pos.line - 1) {
            let width = pos.line.to_string().len();
            output.push_str(&format!("{:width$} |\n", "", width = width));
            output.push_str(&format!("{} | {}\n", pos.line, line));
            output.push_str(&format!(
                "{:width$} | {:>col$}\n",
                "",
                "^",
                width = width,
                col = pos.column
            ));
        }
    }

    output
}
