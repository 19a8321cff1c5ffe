//! Instruction set for the tape VM
//!
//! Eight operators, each a single ASCII character in program text. The
//! compiled form pairs an operator with one operand (see [`Instruction`]).

/// Operators, represented by their source character
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `>` move the pointer right
    Right = b'>',
    /// `<` move the pointer left
    Left = b'<',
    /// `+` increment the current cell
    Inc = b'+',
    /// `-` decrement the current cell
    Dec = b'-',
    /// `.` emit the current cell
    Output = b'.',
    /// `,` read one input value into the current cell
    Input = b',',
    /// `[` skip past the matching `]` if the current cell is zero
    LoopStart = b'[',
    /// `]` jump back to the matching `[` if the current cell is non-zero
    LoopEnd = b']',
}

/// Every legal program character
pub const OPERATORS: [char; 8] = ['>', '<', '+', '-', '.', ',', '[', ']'];

/// Operand of a `[` whose `]` has not been seen yet
///
/// Only exists while the compiler is running; a finished program never
/// contains it.
pub const UNRESOLVED: usize = usize::MAX;

impl Op {
    /// Parse a program character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Op::Right),
            '<' => Some(Op::Left),
            '+' => Some(Op::Inc),
            '-' => Some(Op::Dec),
            '.' => Some(Op::Output),
            ',' => Some(Op::Input),
            '[' => Some(Op::LoopStart),
            ']' => Some(Op::LoopEnd),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        self as u8 as char
    }

    /// Runs of this operator collapse into one instruction
    pub fn is_mergeable(self) -> bool {
        matches!(self, Op::Right | Op::Left | Op::Inc | Op::Dec)
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Op::LoopStart | Op::LoopEnd)
    }
}

/// One compiled instruction
///
/// The operand depends on the operator:
/// - `> < + -`: run length (always >= 1)
/// - `. ,`: 0
/// - `[`: index of the matching `]`
/// - `]`: index of the matching `[`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub operand: usize,
}

impl Instruction {
    pub fn new(op: Op, operand: usize) -> Self {
        Instruction { op, operand }
    }
}
