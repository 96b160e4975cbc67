//! Validate command - run the validation gate without cleaning.

use std::path::PathBuf;

use colored::Colorize;
use datarefine::{DataRefine, Parser, Severity};

pub fn run(file: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (table, source) = Parser::new().parse_file(&file)?;

    if verbose {
        println!(
            "{} {} ({}, {} rows x {} columns)",
            "Loaded".cyan().bold(),
            source.file.white(),
            source.format,
            source.row_count,
            source.column_count
        );
        for col in table.columns() {
            println!("  {:20} {}", col.name, col.column_type.label());
        }
        println!();
    }

    let result = DataRefine::new().validate(&table);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.passed {
            std::process::exit(1);
        }
        return Ok(());
    }

    if result.issues.is_empty() {
        println!("{} no issues found", "Passed:".green().bold());
        return Ok(());
    }

    for issue in &result.issues {
        let label = match issue.severity {
            Severity::Error => issue.severity.label().red().bold(),
            Severity::Warning => issue.severity.label().yellow().bold(),
            Severity::Info => issue.severity.label().blue().bold(),
        };
        println!("{:8} {}", label, issue);
    }

    if result.passed {
        println!(
            "\n{} {} issue(s); cleaning may proceed",
            "Passed:".green().bold(),
            result.issues.len()
        );
        Ok(())
    } else {
        Err(format!("validation failed with {} issue(s)", result.issues.len()).into())
    }
}
