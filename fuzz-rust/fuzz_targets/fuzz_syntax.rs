#![no_main]

use libfuzzer_sys::fuzz_target;
use tapevm::parser::{check_syntax, render_violations};

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Skip very large inputs to avoid timeouts
        if source.len() > 10000 {
            return;
        }

        let violations = check_syntax(source);

        // Property: positions are strictly increasing character indices
        let char_count = source.chars().count();
        for pair in violations.windows(2) {
            assert!(pair[0].position < pair[1].position);
        }
        for violation in &violations {
            assert!(violation.position < char_count);
            assert!(!"><+-.,[]".contains(violation.character));
        }

        // Property: operator count plus violations covers every character
        let operators = source.chars().filter(|c| "><+-.,[]".contains(*c)).count();
        assert_eq!(operators + violations.len(), char_count);

        // Property: rendering never panics
        let _ = render_violations(&violations, source, "fuzz");
    }
});
