//! Human-readable description of a program
//!
//! A pure translation: one line per operator, loops indent their body by two
//! spaces. Nothing is executed. Pointer moves show a running position that
//! starts at 0 and ignores the pointer policy.

use crate::opcodes::Op;
use crate::tape::CellPolicy;

const INDENT: &str = "  ";

/// Describe `source` as it would run on a machine with the given state
pub fn describe(source: &str, capacity: usize, pointer: usize, cell_policy: CellPolicy) -> String {
    let mut out = String::new();

    let behavior = match cell_policy {
        CellPolicy::Wrap => "wrap around (0-255)",
        CellPolicy::Unlimited => "unlimited range",
        CellPolicy::Error => "error on overflow/underflow",
    };
    let (inc_note, dec_note) = match cell_policy {
        CellPolicy::Wrap => ("mod 256", "mod 256"),
        CellPolicy::Unlimited => ("unlimited", "unlimited"),
        CellPolicy::Error => ("0-255, error on overflow", "0-255, error on underflow"),
    };

    out.push_str(&format!("Program loaded with {} characters.\n", source.chars().count()));
    out.push_str(&format!("Memory initialized with {} cells.\n", capacity));
    out.push_str(&format!("Pointer initialized at position {}.\n", pointer));
    out.push_str(&format!("pointer = {}\n\n", pointer));
    out.push_str(&format!("Cell behavior: {}\n\n", behavior));

    let mut position: i64 = 0;
    let mut depth: usize = 0;

    for op in source.chars().filter_map(Op::from_char) {
        if op == Op::LoopEnd {
            depth = depth.saturating_sub(1);
        }
        let line = match op {
            Op::Right => {
                position += 1;
                format!("pointer++ ({})", position)
            }
            Op::Left => {
                position -= 1;
                format!("pointer-- ({})", position)
            }
            Op::Inc => format!("memory[pointer] += 1 ({})", inc_note),
            Op::Dec => format!("memory[pointer] -= 1 ({})", dec_note),
            Op::Output => "print(char(memory[pointer]))".to_string(),
            Op::Input => "memory[pointer] = input_char()".to_string(),
            Op::LoopStart => "while memory[pointer] != 0:".to_string(),
            Op::LoopEnd => "end while".to_string(),
        };

        out.push_str(&INDENT.repeat(depth));
        out.push_str(&line);
        out.push('\n');

        if op == Op::LoopStart {
            depth += 1;
        }
    }

    out
}
