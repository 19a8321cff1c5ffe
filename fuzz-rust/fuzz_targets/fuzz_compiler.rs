#![no_main]

use libfuzzer_sys::fuzz_target;
use tapevm::parser::Compiler;
use tapevm::Op;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Skip very large inputs to avoid timeouts
        if source.len() > 10000 {
            return;
        }

        let mut compiler = Compiler::new();
        let result = compiler.compile(source);

        match result {
            Ok(program) => {
                let instructions = program.instructions();

                // Property: merging never grows the program
                let operators = source.chars().filter(|c| Op::from_char(*c).is_some()).count();
                assert!(instructions.len() <= operators);

                // Property: run lengths add back up to the source
                let total: usize = instructions
                    .iter()
                    .map(|i| if i.op.is_mergeable() { i.operand } else { 1 })
                    .sum();
                assert_eq!(total, operators);

                // Property: every jump points at its partner
                for (index, instr) in instructions.iter().enumerate() {
                    if instr.op.is_jump() {
                        let partner = &instructions[instr.operand];
                        assert!(partner.op.is_jump() && partner.op != instr.op);
                        assert_eq!(partner.operand, index);
                    }
                }

                // Property: the listing has one line per instruction
                assert_eq!(program.listing().lines().count(), instructions.len());

                // Property: statistics account for every merged operator
                let stats = program.stats(source);
                assert_eq!(stats.original_ops, stats.compiled_ops + stats.ops_saved);
            }
            Err(_compile_error) => {
                // Illegal characters and unbalanced brackets are expected
                // The important thing is that we don't panic
            }
        }
    }
});
