// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tankobon - a manga backup snapshot server.
//!
//! Binary entry point: loads configuration, then either serves the
//! snapshot or checks the configuration and backup source.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod check;
mod serve;

/// Tankobon - a manga backup snapshot server.
#[derive(Parser, Debug)]
#[command(name = "tankobon", version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file (skips the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the backup and serve it over HTTP.
    Serve,
    /// Validate the configuration and backup source, then exit.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => tankobon_config::load_and_validate_path(path),
        None => tankobon_config::load_and_validate(),
    };
    let config = match config {
        Ok(config) => config,
        Err(errors) => {
            tankobon_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Check => check::run_check(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
