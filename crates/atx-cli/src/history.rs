//! # History Subcommand
//!
//! Replay a history export for one key and label every write with the change
//! it made.
//!
//! ## Export Format
//!
//! A JSON array of key modifications, in the order the ledger returned them:
//!
//! ```json
//! [
//!   {"txId": "tx1", "timestamp": "2026-01-15T12:00:00Z",
//!    "value": "{\"ID\":\"asset1\",\"Owner\":\"Alice\",\"OwnerOrg\":\"Org1\",\"Value\":\"100\"}"},
//!   {"txId": "tx2", "timestamp": {"seconds": 1768478460, "nanos": 0}, "isDelete": true}
//! ]
//! ```
//!
//! `value` holds the stored record bytes as text. `timestamp` is either an
//! RFC 3339 string with a `Z` suffix or the `seconds`/`nanos` pair.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atx_core::{
    AssetHistory, AssetId, Change, HistoryEntry, KeyModification, RecordError, StateDigest,
    Timestamp,
};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::policy;

/// Arguments for the history subcommand.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// History export file (JSON array of key modifications).
    pub file: PathBuf,

    /// Asset ID the export was queried for.
    #[arg(long)]
    pub key: AssetId,

    /// Only print entries committed at or after this RFC 3339 UTC time.
    #[arg(long)]
    pub since: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Ignore top-level keys outside the record schema.
    #[arg(long)]
    pub permissive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExportedModification {
    tx_id: String,
    timestamp: ExportedTimestamp,
    #[serde(default)]
    is_delete: bool,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportedTimestamp {
    Rfc3339(String),
    Epoch {
        seconds: i64,
        #[serde(default)]
        nanos: u32,
    },
}

impl ExportedTimestamp {
    fn resolve(&self) -> Result<Timestamp, RecordError> {
        match self {
            Self::Rfc3339(s) => Timestamp::parse(s),
            Self::Epoch { seconds, nanos } => Timestamp::from_epoch(*seconds, *nanos),
        }
    }
}

#[derive(Debug, Serialize)]
struct HistoryLine<'a> {
    #[serde(flatten)]
    entry: &'a HistoryEntry,
    change: Change,
    digest: Option<StateDigest>,
}

/// Read a history export into raw modifications, keeping file order.
pub fn load_modifications(path: &Path) -> Result<Vec<KeyModification>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let exported: Vec<ExportedModification> = serde_json::from_slice(&bytes)
        .with_context(|| format!("invalid history export in {}", path.display()))?;

    exported
        .into_iter()
        .enumerate()
        .map(|(i, m)| -> Result<KeyModification> {
            let timestamp = m
                .timestamp
                .resolve()
                .with_context(|| format!("entry {i} ({})", m.tx_id))?;
            Ok(KeyModification {
                tx_id: m.tx_id,
                timestamp,
                is_delete: m.is_delete,
                value: m.value.into_bytes(),
            })
        })
        .collect()
}

/// Execute the history subcommand.
pub fn run_history(args: &HistoryArgs) -> Result<u8> {
    let since = args
        .since
        .as_deref()
        .map(Timestamp::parse)
        .transpose()
        .context("invalid --since timestamp")?;

    let modifications = load_modifications(&args.file)?;
    let history = AssetHistory::from_modifications(
        args.key.clone(),
        &modifications,
        policy(args.permissive),
    )
    .with_context(|| format!("invalid history in {}", args.file.display()))?;

    for entry in history.out_of_order() {
        tracing::warn!(
            tx_id = %entry.tx_id,
            timestamp = %entry.timestamp,
            "timestamp is earlier than the preceding commit"
        );
    }

    let mut lines = Vec::new();
    for (entry, change) in history.changes()? {
        if since.is_some_and(|t| entry.timestamp < t) {
            continue;
        }
        let digest = entry.asset.as_ref().map(|a| a.state_digest()).transpose()?;
        lines.push(HistoryLine {
            entry,
            change,
            digest,
        });
    }

    tracing::info!(
        key = %history.key(),
        entries = history.len(),
        shown = lines.len(),
        "history replayed"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for line in &lines {
            let asset = line
                .entry
                .asset
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            println!(
                "{}  {}  {:<13}  {asset}",
                line.entry.timestamp,
                line.entry.tx_id,
                line.change.as_str()
            );
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    const EXPORT: &str = r#"[
        {"txId": "tx1", "timestamp": "2026-01-15T12:00:00Z",
         "value": "{\"ID\":\"asset1\",\"Owner\":\"Alice\",\"OwnerOrg\":\"Org1\",\"Value\":\"100\"}"},
        {"txId": "tx2", "timestamp": {"seconds": 1768478460, "nanos": 500},
         "value": "{\"ID\":\"asset1\",\"Owner\":\"Bob\",\"OwnerOrg\":\"Org2\",\"Value\":\"100\"}"},
        {"txId": "tx3", "timestamp": {"seconds": 1768478520}, "isDelete": true}
    ]"#;

    fn args(file: PathBuf) -> HistoryArgs {
        HistoryArgs {
            file,
            key: "asset1".parse().unwrap(),
            since: None,
            json: false,
            permissive: false,
        }
    }

    #[test]
    fn load_keeps_file_order_and_both_timestamp_forms() {
        let dir = tempfile::tempdir().unwrap();
        let mods = load_modifications(&write_file(&dir, "h.json", EXPORT)).unwrap();
        let ids: Vec<&str> = mods.iter().map(|m| m.tx_id.as_str()).collect();
        assert_eq!(ids, vec!["tx1", "tx2", "tx3"]);
        assert_eq!(
            mods[0].timestamp,
            Timestamp::from_epoch(1_768_478_400, 0).unwrap()
        );
        assert_eq!(
            mods[1].timestamp,
            Timestamp::from_epoch(1_768_478_460, 500).unwrap()
        );
        assert!(mods[2].is_delete);
        assert!(mods[2].value.is_empty());
    }

    #[test]
    fn load_rejects_offset_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let export = r#"[{"txId": "tx1", "timestamp": "2026-01-15T12:00:00+01:00", "isDelete": true}]"#;
        let err = load_modifications(&write_file(&dir, "h.json", export)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid timestamp"), "{err:#}");
    }

    #[test]
    fn load_rejects_unknown_export_fields() {
        let dir = tempfile::tempdir().unwrap();
        let export = r#"[{"txId": "tx1", "timestamp": "2026-01-15T12:00:00Z", "isDeleted": true}]"#;
        assert!(load_modifications(&write_file(&dir, "h.json", export)).is_err());
    }

    #[test]
    fn replay_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(write_file(&dir, "h.json", EXPORT));
        assert_eq!(run_history(&a).unwrap(), 0);
        a.json = true;
        a.since = Some("2026-01-15T12:01:00Z".to_string());
        assert_eq!(run_history(&a).unwrap(), 0);
    }

    #[test]
    fn invalid_since_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(write_file(&dir, "h.json", EXPORT));
        a.since = Some("2026-01-15T12:00:00+00:00".to_string());
        let err = run_history(&a).unwrap_err();
        assert!(format!("{err:#}").contains("--since"), "{err:#}");
    }

    #[test]
    fn foreign_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(write_file(&dir, "h.json", EXPORT));
        a.key = "asset2".parse().unwrap();
        assert!(run_history(&a).is_err());
    }

    #[test]
    fn skewed_timestamps_keep_commit_order() {
        let dir = tempfile::tempdir().unwrap();
        let export = r#"[
            {"txId": "tx1", "timestamp": {"seconds": 20},
             "value": "{\"ID\":\"asset1\",\"Owner\":\"Alice\",\"OwnerOrg\":\"Org1\",\"Value\":\"1\"}"},
            {"txId": "tx2", "timestamp": {"seconds": 10},
             "value": "{\"ID\":\"asset1\",\"Owner\":\"Alice\",\"OwnerOrg\":\"Org1\",\"Value\":\"2\"}"}
        ]"#;
        let path = write_file(&dir, "h.json", export);
        let mods = load_modifications(&path).unwrap();
        let history =
            AssetHistory::from_modifications("asset1".parse().unwrap(), &mods, policy(false))
                .unwrap();
        assert_eq!(history.current().unwrap().value().as_str(), "2");
        assert_eq!(history.out_of_order().len(), 1);
        assert_eq!(run_history(&args(path)).unwrap(), 0);
    }

    #[test]
    fn history_line_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mods = load_modifications(&write_file(&dir, "h.json", EXPORT)).unwrap();
        let history =
            AssetHistory::from_modifications("asset1".parse().unwrap(), &mods, policy(false))
                .unwrap();
        let changes = history.changes().unwrap();
        let (entry, change) = changes[1];
        let line = HistoryLine {
            entry,
            change,
            digest: entry.asset.as_ref().map(|a| a.state_digest().unwrap()),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["tx_id"], "tx2");
        assert_eq!(json["change"], "transferred");
        assert_eq!(json["timestamp"], "2026-01-15T12:01:00.000000500Z");
        assert_eq!(json["asset"]["Owner"], "Bob");
        assert!(json["digest"].as_str().unwrap().starts_with("sha256:"));
    }
}
