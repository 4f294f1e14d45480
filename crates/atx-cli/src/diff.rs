//! # Diff Subcommand
//!
//! Compare two versions of the same asset and report what changed, the way
//! a history audit would classify the write between them.

use std::path::PathBuf;

use anyhow::Result;
use atx_core::{Asset, Change};
use clap::Args;

use crate::{policy, read_record};

/// Arguments for the diff subcommand.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Earlier version of the record.
    pub before: PathBuf,

    /// Later version of the record.
    pub after: PathBuf,

    /// Emit a JSON report instead of text.
    #[arg(long)]
    pub json: bool,

    /// Ignore top-level keys outside the record schema.
    #[arg(long)]
    pub permissive: bool,
}

/// Execute the diff subcommand.
pub fn run_diff(args: &DiffArgs) -> Result<u8> {
    let policy = policy(args.permissive);
    let before = read_record(&args.before, policy)?;
    let after = read_record(&args.after, policy)?;
    let change = Change::between(Some(&before), Some(&after))?;

    tracing::info!(id = %before.id(), %change, "classified change");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report(&before, &after, change)?)?);
    } else {
        println!("{}: {change}", before.id());
        for (field, old, new) in changed_fields(&before, &after) {
            println!("  {field:<9} {old} -> {new}");
        }
    }
    Ok(0)
}

fn changed_fields<'a>(before: &'a Asset, after: &'a Asset) -> Vec<(&'static str, &'a str, &'a str)> {
    [
        ("Value", before.value().as_str(), after.value().as_str()),
        ("Owner", before.owner().as_str(), after.owner().as_str()),
        ("OwnerOrg", before.owner_org().as_str(), after.owner_org().as_str()),
    ]
    .into_iter()
    .filter(|(_, old, new)| old != new)
    .collect()
}

fn report(before: &Asset, after: &Asset, change: Change) -> Result<serde_json::Value> {
    Ok(serde_json::json!({
        "id": before.id(),
        "change": change,
        "before": before,
        "after": after,
        "before_digest": before.state_digest()?,
        "after_digest": after.state_digest()?,
        "fields": changed_fields(before, after)
            .into_iter()
            .map(|(field, _, _)| field)
            .collect::<Vec<_>>(),
    }))
}
