//! Clean command - run the full pipeline and write the results.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use datarefine::{CleanConfig, ConflictPolicy, DataRefine, Parser, RefineError};

use crate::cli::CaseChoice;

pub struct CleanArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub json: bool,
    pub casing: CaseChoice,
    pub key: Option<String>,
    pub threshold: f64,
    pub strict: bool,
    pub keep_conflicts: bool,
    pub verbose: bool,
}

pub fn run(args: CleanArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    println!(
        "{} {}",
        "Cleaning".cyan().bold(),
        args.file.display().to_string().white()
    );

    let (table, source) = Parser::new().parse_file(&args.file)?;

    let config = CleanConfig {
        casing: args.casing.into(),
        missing_threshold: args.threshold,
        key_columns: args
            .key
            .as_deref()
            .map(|k| k.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        conflict_policy: if args.keep_conflicts {
            ConflictPolicy::Manual
        } else {
            ConflictPolicy::PreferComplete
        },
        strict_types: args.strict,
        ..CleanConfig::default()
    };

    let report = match DataRefine::with_config(config).clean(table) {
        Ok(report) => report,
        Err(RefineError::Validation(failure)) => {
            eprintln!("{}", "Validation failed:".red().bold());
            for issue in &failure.issues {
                eprintln!("  {}", issue);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    // Cleaned CSV
    let output_path = args.output.unwrap_or_else(|| {
        let mut p = args.file.clone();
        let stem = p.file_stem().unwrap_or_default().to_string_lossy().into_owned();
        p.set_file_name(format!("{}.cleaned.csv", stem));
        p
    });
    fs::write(&output_path, report.table.to_csv_string()?)?;

    // Report
    if let Some(ref report_path) = args.report {
        fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{}", report.render());
        if args.verbose {
            println!("Operation Log:");
            for entry in &report.log {
                let location = match (&entry.column, entry.row) {
                    (Some(col), Some(row)) => format!("{}[{}]", col, row),
                    (Some(col), None) => col.clone(),
                    _ => String::new(),
                };
                println!(
                    "  {:14} {:24} {:12} {}",
                    entry.stage.label(),
                    entry.rule,
                    location,
                    entry.explanation
                );
            }
            println!();
        }
    }

    let s = &report.summary;
    println!(
        "{} {} -> {} rows, {} imputed, {} duplicates removed, {} conflict(s) unresolved",
        "Done:".green().bold(),
        source.row_count,
        s.rows_after,
        (s.numeric_cells_imputed + s.categorical_cells_imputed)
            .to_string()
            .white()
            .bold(),
        s.duplicates_removed.to_string().white().bold(),
        if s.conflicts_unresolved > 0 {
            s.conflicts_unresolved.to_string().yellow().bold()
        } else {
            s.conflicts_unresolved.to_string().white()
        }
    );
    println!("Cleaned data written to {}", output_path.display());

    Ok(())
}
