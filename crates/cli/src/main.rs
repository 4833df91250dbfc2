//! Command line tools for data modules: parse, check, describe, simulate.
//!
//! Run with: `datacheck <command>`

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Describe, Parse, Simulate};

/// Inspect and exercise data modules
#[derive(Parser)]
#[command(name = "datacheck")]
#[command(about = "Validation and inspection tools for data modules", long_about = None)]
#[command(version)]
struct Cli {
    /// Runtime configuration file (TOML). Environment variables override it.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write logs to a file in the platform cache directory, or in
    /// DATACHECK_LOG_DIR when set
    #[arg(long, global = true)]
    log_file: bool,

    /// Write logs to a file in this directory (implies --log-file)
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Parse a markup file and print it in canonical form
    Parse(Parse),

    /// Load every module and report validation errors
    Check(Check),

    /// Print the description of a scripted effect
    Describe(Describe),

    /// Run the scheduler for a number of ticks
    Simulate(Simulate),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for DATA_ROOT and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_dir = if cli.log_file || cli.log_dir.is_some() {
        Some(logging::log_dir(
            cli.log_dir.clone(),
            std::env::var_os(logging::LOG_DIR_ENV),
        )?)
    } else {
        None
    };
    let _guard = logging::setup(log_dir.as_deref())?;

    let config = cli.config.as_deref();
    match cli.command {
        Command::Parse(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(config),
        Command::Describe(cmd) => cmd.execute(config),
        Command::Simulate(cmd) => cmd.execute(config),
    }
}
