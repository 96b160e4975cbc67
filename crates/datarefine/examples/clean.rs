//! Example: Clean a tabular data file with DataRefine.
//!
//! Usage:
//!   cargo run --example clean -- <file_path>
//!
//! Example:
//!   cargo run --example clean -- test_data/customers.csv

use std::env;
use std::path::Path;

use datarefine::{DataRefine, Parser, RefineError, Severity};

fn main() -> datarefine::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example clean -- <file_path>");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("DataRefine Cleaning: {}", file_path);
    println!("{}", separator);
    println!();

    let parser = Parser::new();
    let (table, source) = parser.parse_file(path)?;

    println!("## Source Metadata");
    println!("  File: {}", source.file);
    println!("  Format: {}", source.format);
    println!("  Rows: {}", source.row_count);
    println!("  Columns: {}", source.column_count);
    println!();

    println!("## Schema ({} columns)", table.column_count());
    for col in table.columns() {
        println!(
            "  {:20} {:12} missing={:.0}%",
            col.name,
            col.column_type.label(),
            col.missing_ratio() * 100.0
        );
    }
    println!();

    let report = match DataRefine::new().clean(table) {
        Ok(report) => report,
        Err(RefineError::Validation(failure)) => {
            eprintln!("Validation failed:");
            for issue in &failure.issues {
                eprintln!("  {}", issue);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    println!("{}", report.render());

    if !report.issues.is_empty() {
        let errors = report.issues_at_least(Severity::Error).count();
        println!(
            "## Issues ({} total, {} error-level)",
            report.issues.len(),
            errors
        );
        for issue in &report.issues {
            println!("  {}", issue);
        }
        println!();
    }

    println!("## Cleaned Data");
    print!("{}", report.table.to_csv_string()?);
    println!("{}", separator);

    Ok(())
}
