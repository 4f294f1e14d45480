//! # atx-cli — Asset Record Inspection CLI
//!
//! Offline tooling for asset records pulled from world state or history
//! exports. Every subcommand reads record files from disk and never talks to
//! a ledger.
//!
//! ## Subcommands
//!
//! - `validate` — decode one or more record files and report schema errors
//! - `canonicalize` — re-emit a record as its canonical stored bytes
//! - `digest` — print (or check) the SHA-256 state digest of a record
//! - `diff` — classify the change between two versions of one asset
//! - `history` — replay a history export and label each write
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the subcommand modules; record semantics live
//!   in `atx-core`.
//! - Handlers return `anyhow::Result<u8>`, the process exit code.

pub mod canonicalize;
pub mod diff;
pub mod digest;
pub mod history;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use atx_core::{Asset, SchemaPolicy};

/// Map the `--permissive` flag to a decode policy.
pub fn policy(permissive: bool) -> SchemaPolicy {
    if permissive {
        SchemaPolicy::Permissive
    } else {
        SchemaPolicy::Strict
    }
}

/// Read and decode a record file.
pub fn read_record(path: &Path, policy: SchemaPolicy) -> Result<Asset> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let asset = Asset::from_slice_with(&bytes, policy)
        .with_context(|| format!("invalid record in {}", path.display()))?;
    tracing::debug!(path = %path.display(), id = %asset.id(), "decoded record");
    Ok(asset)
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// Write `contents` to `name` inside `dir`, returning the path.
    pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub const ASSET1: &str =
        r#"{"ID":"asset1","Value":"100","Owner":"Alice","OwnerOrg":"Org1"}"#;
}
