//! # Validate Subcommand
//!
//! Decode record files and report which ones do not match the schema.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::{policy, read_record};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Ignore top-level keys outside the record schema.
    #[arg(long)]
    pub permissive: bool,
}

/// Execute the validate subcommand. Exit code 1 if any file is invalid.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let policy = policy(args.permissive);
    let mut failures = 0usize;

    for path in &args.files {
        match read_record(path, policy) {
            Ok(asset) => println!("ok       {}  {}", path.display(), asset.id()),
            Err(e) => {
                failures += 1;
                tracing::warn!(path = %path.display(), "record rejected");
                println!("invalid  {}  {e:#}", path.display());
            }
        }
    }

    tracing::info!(
        checked = args.files.len(),
        failures,
        ?policy,
        "validation finished"
    );
    Ok(u8::from(failures > 0))
}
