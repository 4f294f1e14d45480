//! # Canonicalize Subcommand
//!
//! Re-emit a record as the exact bytes that belong in world state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{policy, read_record};

/// Arguments for the canonicalize subcommand.
#[derive(Args, Debug)]
pub struct CanonicalizeArgs {
    /// Record file to canonicalize.
    pub file: PathBuf,

    /// Write the canonical bytes here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Drop top-level keys outside the record schema instead of failing.
    #[arg(long)]
    pub permissive: bool,
}

/// Execute the canonicalize subcommand.
pub fn run_canonicalize(args: &CanonicalizeArgs) -> Result<u8> {
    let asset = read_record(&args.file, policy(args.permissive))?;
    let bytes = asset.to_canonical_bytes()?;

    match &args.output {
        Some(out) => {
            std::fs::write(out, bytes.as_bytes())
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(id = %asset.id(), output = %out.display(), "wrote canonical record");
        }
        None => println!("{}", String::from_utf8_lossy(bytes.as_bytes())),
    }
    Ok(0)
}
