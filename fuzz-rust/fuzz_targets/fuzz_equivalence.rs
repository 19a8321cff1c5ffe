#![no_main]

use libfuzzer_sys::fuzz_target;
use tapevm::{CellPolicy, Machine, PointerPolicy};

const BUDGET: usize = 10_000;
const CAPACITY: usize = 16;

const POINTER_POLICIES: [PointerPolicy; 3] =
    [PointerPolicy::Clamp, PointerPolicy::Wrap, PointerPolicy::Error];
const CELL_POLICIES: [CellPolicy; 3] = [CellPolicy::Wrap, CellPolicy::Unlimited, CellPolicy::Error];

fn machine(pointer: PointerPolicy, cell: CellPolicy, source: &str) -> Machine {
    let mut machine =
        Machine::with_policies(CAPACITY, pointer, cell).expect("capacity is non-zero");
    machine.load(source, "fuzz");
    machine
}

fuzz_target!(|data: &[u8]| {
    // First byte selects the policy pair, the rest is the program
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let pointer = POINTER_POLICIES[(selector % 3) as usize];
    let cell = CELL_POLICIES[((selector / 3) % 3) as usize];

    if let Ok(source) = std::str::from_utf8(rest) {
        // Skip very large inputs to avoid timeouts
        if source.len() > 2000 {
            return;
        }

        // Bulk run first; only compare runs that finish cleanly inside the budget
        let mut fast = machine(pointer, cell, source);
        let Ok(steps) = fast.run_fast(BUDGET) else {
            return;
        };
        if steps >= BUDGET {
            return;
        }

        let mut stepped = machine(pointer, cell, source);
        stepped
            .run_until_end(usize::MAX)
            .expect("single-step run should succeed where the bulk run did");

        let mut chunked = machine(pointer, cell, source);
        while chunked.run_chunk(7, BUDGET).expect("chunked run should succeed") {}

        // Property: all engines agree on memory, pointer and output
        assert_eq!(stepped.memory(), fast.memory());
        assert_eq!(stepped.pointer(), fast.pointer());
        assert_eq!(stepped.output(), fast.output());
        assert_eq!(chunked.memory(), fast.memory());
        assert_eq!(chunked.pointer(), fast.pointer());
        assert_eq!(chunked.output(), fast.output());
    }
});
