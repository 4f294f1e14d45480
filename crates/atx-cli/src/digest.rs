//! # Digest Subcommand
//!
//! Print the SHA-256 state digest of a record, or check it against an
//! expected value.

use std::path::PathBuf;

use anyhow::{Context, Result};
use atx_core::StateDigest;
use clap::Args;

use crate::{policy, read_record};

/// Arguments for the digest subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Record file to hash.
    pub file: PathBuf,

    /// Expected digest (`sha256:<hex>` or bare hex). Exit code 1 on mismatch.
    #[arg(long)]
    pub expect: Option<String>,

    /// Drop top-level keys outside the record schema instead of failing.
    #[arg(long)]
    pub permissive: bool,
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let expected = args
        .expect
        .as_deref()
        .map(str::parse::<StateDigest>)
        .transpose()
        .context("invalid --expect digest")?;

    let asset = read_record(&args.file, policy(args.permissive))?;
    let digest = asset.state_digest()?;
    println!("{digest}");

    match expected {
        Some(want) if want != digest => {
            tracing::error!(id = %asset.id(), %want, got = %digest, "digest mismatch");
            Ok(1)
        }
        _ => Ok(0),
    }
}
