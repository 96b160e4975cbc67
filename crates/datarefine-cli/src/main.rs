//! DataRefine CLI - deterministic cleaning for tabular datasets.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file, json } => commands::validate::run(file, json, cli.verbose),

        Commands::Clean {
            file,
            output,
            report,
            json,
            casing,
            key,
            threshold,
            strict,
            keep_conflicts,
        } => commands::clean::run(commands::clean::CleanArgs {
            file,
            output,
            report,
            json,
            casing,
            key,
            threshold,
            strict,
            keep_conflicts,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
