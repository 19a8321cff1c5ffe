//! Integration tests for the parser

use super::*;
use crate::opcodes::{Instruction, Op};

/// Helper to compile source and return the raw instructions
fn compile_ops(source: &str) -> Vec<Instruction> {
    compile(source).unwrap().instructions().to_vec()
}

/// Helper to compile source and return (operator, operand) pairs
fn compile_pairs(source: &str) -> Vec<(char, usize)> {
    compile_ops(source)
        .iter()
        .map(|i| (i.op.as_char(), i.operand))
        .collect()
}

/// Check that every loop instruction points at its partner and back
fn assert_jumps_paired(instructions: &[Instruction]) {
    for (index, instr) in instructions.iter().enumerate() {
        match instr.op {
            Op::LoopStart => {
                let end = &instructions[instr.operand];
                assert_eq!(end.op, Op::LoopEnd, "[ at {} does not target a ]", index);
                assert_eq!(end.operand, index);
                assert!(instr.operand > index);
            }
            Op::LoopEnd => {
                let start = &instructions[instr.operand];
                assert_eq!(start.op, Op::LoopStart, "] at {} does not target a [", index);
                assert_eq!(start.operand, index);
                assert!(instr.operand < index);
            }
            _ => {}
        }
    }
}

// ===== Syntax validation =====

#[test]
fn test_validator_accepts_all_operators() {
    assert!(check_syntax("><+-.,[]").is_empty());
}

#[test]
fn test_validator_reports_positions_in_order() {
    let violations = check_syntax("a+b\n-");
    let found: Vec<(usize, char)> = violations.iter().map(|v| (v.position, v.character)).collect();
    assert_eq!(found, vec![(0, 'a'), (2, 'b'), (3, '\n')]);
}

#[test]
fn test_validator_counts_characters_not_bytes() {
    let violations = check_syntax("+é+x");
    assert_eq!(violations[0].position, 1);
    assert_eq!(violations[1].position, 3);
}

#[test]
fn test_validator_ignores_bracket_balance() {
    assert!(check_syntax("[[[").is_empty());
    assert!(check_syntax("]").is_empty());
}

#[test]
fn test_render_points_at_column() {
    let source = "++\n+q";
    let violations = check_syntax(source);
    let rendered = render_violations(&violations[1..], source, "prog.b");
    assert!(rendered.contains("Error: unexpected character 'q'"));
    assert!(rendered.contains("  --> prog.b:2:2"));
    assert!(rendered.contains("2 | +q"));
    assert!(rendered.ends_with("  |  ^\n"));
}

// ===== Compilation =====

#[test]
fn test_compile_never_merges_brackets() {
    assert_eq!(
        compile_pairs("[[]]"),
        vec![('[', 3), ('[', 2), (']', 1), (']', 0)]
    );
}

#[test]
fn test_compile_runs_split_by_other_operators() {
    assert_eq!(
        compile_pairs("++-++"),
        vec![('+', 2), ('-', 1), ('+', 2)]
    );
}

#[test]
fn test_compile_empty_loop_targets_each_other() {
    assert_eq!(compile_pairs("[]"), vec![('[', 1), (']', 0)]);
}

#[test]
fn test_compile_resolves_loop_targets() {
    let ops = compile_ops("+[->+<]");
    assert_eq!(ops[1], Instruction::new(Op::LoopStart, 6));
    assert_eq!(ops[6], Instruction::new(Op::LoopEnd, 1));
    assert_jumps_paired(&ops);
}

#[test]
fn test_compile_deeply_nested_targets() {
    let ops = compile_ops("[>[>[-]<]<]+[.]");
    assert_jumps_paired(&ops);
    assert_eq!(ops.len(), 15);
}

#[test]
fn test_compile_syntax_error_lists_all() {
    let err = compile("a+!").unwrap_err();
    match &err {
        CompileError::Syntax(violations) => assert_eq!(violations.len(), 2),
        other => panic!("Expected Syntax, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Syntax errors found: (0, 'a') (2, '!')");
}

#[test]
fn test_compile_unmatched_open() {
    let err = compile("+[[]").unwrap_err();
    assert_eq!(err, CompileError::UnmatchedOpen { position: 1 });
    assert_eq!(err.to_string(), "Unmatched '[' found at position 1.");
}

#[test]
fn test_compile_unmatched_open_reports_innermost() {
    assert_eq!(
        compile("[+[").unwrap_err(),
        CompileError::UnmatchedOpen { position: 2 }
    );
}

#[test]
fn test_compile_unmatched_close() {
    let err = compile("+]").unwrap_err();
    assert_eq!(err, CompileError::UnmatchedClose { position: 1 });
    assert_eq!(err.position(), Some(1));
}
