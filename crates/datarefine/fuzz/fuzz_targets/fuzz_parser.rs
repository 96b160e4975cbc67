//! Fuzz target for the CSV/JSON parser.
//!
//! This fuzzer tests that the parser:
//! 1. Never panics on malformed input
//! 2. Handles all delimiter combinations
//! 3. Produces structurally valid tables when it succeeds

#![no_main]

use libfuzzer_sys::fuzz_target;
use datarefine::Parser;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let parser = Parser::new();
        if let Ok(table) = parser.from_csv_str(content) {
            // A successful parse must satisfy the structural invariants.
            assert!(table.column_count() > 0);
            for col in table.columns() {
                assert_eq!(col.len(), table.row_count());
            }
        }
        let _ = parser.from_json_str(content);
    }
});
