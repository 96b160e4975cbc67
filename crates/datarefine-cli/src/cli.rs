//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use datarefine::CaseRule;
use std::path::PathBuf;

/// DataRefine: deterministic cleaning for tabular datasets
#[derive(Parser)]
#[command(name = "datarefine")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a data file without cleaning it
    Validate {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print issues as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the full cleaning pipeline on a data file
    Clean {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the cleaned CSV (default: <file>.cleaned.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the full report to this path as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Casing rule for text columns
        #[arg(long, value_enum, default_value = "preserve")]
        casing: CaseChoice,

        /// Comma-separated key column(s) for duplicate detection
        #[arg(short, long)]
        key: Option<String>,

        /// Missing-value ratio above which a column is flagged
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Abort when a column fails type consistency
        #[arg(long)]
        strict: bool,

        /// Keep conflicting duplicate rows instead of auto-resolving
        #[arg(long)]
        keep_conflicts: bool,
    },
}

/// Casing rule choices exposed on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CaseChoice {
    Lower,
    Upper,
    Title,
    Preserve,
}

impl From<CaseChoice> for CaseRule {
    fn from(choice: CaseChoice) -> Self {
        match choice {
            CaseChoice::Lower => CaseRule::Lower,
            CaseChoice::Upper => CaseRule::Upper,
            CaseChoice::Title => CaseRule::Title,
            CaseChoice::Preserve => CaseRule::PreserveConsistent,
        }
    }
}
