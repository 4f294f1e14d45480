//! # atx CLI entry point
//!
//! Parses command-line arguments, initializes tracing, and dispatches to the
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atx_cli::canonicalize::{run_canonicalize, CanonicalizeArgs};
use atx_cli::diff::{run_diff, DiffArgs};
use atx_cli::digest::{run_digest, DigestArgs};
use atx_cli::history::{run_history, HistoryArgs};
use atx_cli::validate::{run_validate, ValidateArgs};

/// Asset record inspection tool.
///
/// Validates, canonicalizes, hashes, and compares asset records exported
/// from ledger world state or history queries.
#[derive(Parser, Debug)]
#[command(name = "atx", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check record files against the asset schema.
    Validate(ValidateArgs),

    /// Print a record as its canonical stored bytes.
    Canonicalize(CanonicalizeArgs),

    /// Print or verify the SHA-256 state digest of a record.
    Digest(DigestArgs),

    /// Classify the change between two versions of an asset.
    Diff(DiffArgs),

    /// Replay a history export and label each write.
    History(HistoryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "atx starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Canonicalize(args) => run_canonicalize(&args),
        Commands::Digest(args) => run_digest(&args),
        Commands::Diff(args) => run_diff(&args),
        Commands::History(args) => run_history(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
