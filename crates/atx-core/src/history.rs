//! # History Decoding
//!
//! A history query returns one [`KeyModification`] per committed write to a
//! key: the transaction ID, commit time, a delete flag, and the stored bytes.
//! This module decodes those into [`HistoryEntry`] values and classifies the
//! step between consecutive versions as a [`Change`].
//!
//! Classification uses full-record equality, so it distinguishes a value
//! update from a transfer even though both keep the same ID.

use serde::Serialize;

use crate::asset::{Asset, SchemaPolicy};
use crate::error::RecordError;
use crate::identity::AssetId;
use crate::temporal::Timestamp;

/// One raw entry from a ledger history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub is_delete: bool,
    /// Stored bytes. Empty (and ignored) for deletes.
    pub value: Vec<u8>,
}

/// A decoded history entry. `asset` is `None` exactly when the write was a
/// delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub asset: Option<Asset>,
}

impl HistoryEntry {
    /// Decode a raw modification.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedRecord`] if a non-delete entry does not
    /// hold a valid record under `policy`.
    pub fn decode(modification: &KeyModification, policy: SchemaPolicy) -> Result<Self, RecordError> {
        let asset = if modification.is_delete {
            None
        } else {
            Some(Asset::from_slice_with(&modification.value, policy)?)
        };
        Ok(Self {
            tx_id: modification.tx_id.clone(),
            timestamp: modification.timestamp,
            asset,
        })
    }

    pub fn is_delete(&self) -> bool {
        self.asset.is_none()
    }
}

/// What a write did to the record, relative to the version before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    /// The key had no record (never written, or deleted) and now has one.
    Created,
    /// Only `Value` changed.
    ValueUpdated,
    /// Only the `Owner`/`OwnerOrg` pair changed.
    Transferred,
    /// Both the value and the ownership changed in one write.
    Updated,
    /// The record was removed.
    Deleted,
    /// The write stored an identical record, or deleted an absent one.
    Unchanged,
}

impl Change {
    /// Classify the step from `before` to `after`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::KeyMismatch`] if both versions exist but carry
    /// different IDs.
    pub fn between(before: Option<&Asset>, after: Option<&Asset>) -> Result<Self, RecordError> {
        let change = match (before, after) {
            (None, None) => Self::Unchanged,
            (None, Some(_)) => Self::Created,
            (Some(_), None) => Self::Deleted,
            (Some(a), Some(b)) => {
                if !a.same_asset(b) {
                    return Err(RecordError::KeyMismatch {
                        expected: a.id().to_string(),
                        found: b.id().to_string(),
                    });
                }
                let value_changed = a.value() != b.value();
                let owner_changed = a.owner() != b.owner() || a.owner_org() != b.owner_org();
                match (value_changed, owner_changed) {
                    (false, false) => Self::Unchanged,
                    (true, false) => Self::ValueUpdated,
                    (false, true) => Self::Transferred,
                    (true, true) => Self::Updated,
                }
            }
        };
        Ok(change)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ValueUpdated => "value_updated",
            Self::Transferred => "transferred",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded history of a single key, in ledger commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHistory {
    key: AssetId,
    entries: Vec<HistoryEntry>,
}

impl AssetHistory {
    /// Decode the modifications returned for `key`.
    ///
    /// Entries keep the order the ledger returned them in, which is commit
    /// order. Timestamps are client-proposed and are never used to reorder;
    /// see [`AssetHistory::out_of_order()`].
    ///
    /// # Errors
    ///
    /// Fails on the first malformed entry, or with
    /// [`RecordError::KeyMismatch`] if an entry decodes to another asset.
    pub fn from_modifications<'a, I>(
        key: AssetId,
        modifications: I,
        policy: SchemaPolicy,
    ) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = &'a KeyModification>,
    {
        let entries = modifications
            .into_iter()
            .map(|m| HistoryEntry::decode(m, policy))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(found) = entries
            .iter()
            .filter_map(|e| e.asset.as_ref())
            .find(|a| a.id() != &key)
        {
            return Err(RecordError::KeyMismatch {
                expected: key.to_string(),
                found: found.id().to_string(),
            });
        }

        Ok(Self { key, entries })
    }

    pub fn key(&self) -> &AssetId {
        &self.key
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The record as of the latest entry; `None` if deleted or never written.
    pub fn current(&self) -> Option<&Asset> {
        self.entries.last().and_then(|e| e.asset.as_ref())
    }

    /// Entries whose timestamp is earlier than the entry committed before
    /// them.
    pub fn out_of_order(&self) -> Vec<&HistoryEntry> {
        self.entries
            .windows(2)
            .filter(|pair| pair[1].timestamp < pair[0].timestamp)
            .map(|pair| &pair[1])
            .collect()
    }

    /// Each entry paired with what it changed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::KeyMismatch`] if two consecutive versions carry
    /// different IDs.
    pub fn changes(&self) -> Result<Vec<(&HistoryEntry, Change)>, RecordError> {
        let mut previous: Option<&Asset> = None;
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let current = entry.asset.as_ref();
            out.push((entry, Change::between(previous, current)?));
            previous = current;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(value: &str, owner: &str, org: &str) -> Asset {
        Asset::from_parts("asset1", value, owner, org).unwrap()
    }

    fn write(tx: &str, secs: i64, a: &Asset) -> KeyModification {
        KeyModification {
            tx_id: tx.to_string(),
            timestamp: Timestamp::from_epoch(secs, 0).unwrap(),
            is_delete: false,
            value: a.to_canonical_bytes().unwrap().into_vec(),
        }
    }

    fn delete(tx: &str, secs: i64) -> KeyModification {
        KeyModification {
            tx_id: tx.to_string(),
            timestamp: Timestamp::from_epoch(secs, 0).unwrap(),
            is_delete: true,
            value: Vec::new(),
        }
    }

    fn key() -> AssetId {
        AssetId::new("asset1").unwrap()
    }

    #[test]
    fn test_change_classification() {
        let a = asset("100", "Alice", "Org1");
        let valued = asset("200", "Alice", "Org1");
        let moved = asset("100", "Bob", "Org2");
        let org_only = asset("100", "Alice", "Org2");
        let both = asset("200", "Bob", "Org2");

        assert_eq!(Change::between(None, Some(&a)).unwrap(), Change::Created);
        assert_eq!(Change::between(Some(&a), None).unwrap(), Change::Deleted);
        assert_eq!(Change::between(None, None).unwrap(), Change::Unchanged);
        assert_eq!(Change::between(Some(&a), Some(&a)).unwrap(), Change::Unchanged);
        assert_eq!(Change::between(Some(&a), Some(&valued)).unwrap(), Change::ValueUpdated);
        assert_eq!(Change::between(Some(&a), Some(&moved)).unwrap(), Change::Transferred);
        assert_eq!(Change::between(Some(&a), Some(&org_only)).unwrap(), Change::Transferred);
        assert_eq!(Change::between(Some(&a), Some(&both)).unwrap(), Change::Updated);
    }

    #[test]
    fn test_change_rejects_different_assets() {
        let a = asset("1", "Alice", "Org1");
        let b = Asset::from_parts("asset2", "1", "Alice", "Org1").unwrap();
        assert!(matches!(
            Change::between(Some(&a), Some(&b)),
            Err(RecordError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_full_lifecycle() {
        let created = asset("100", "Alice", "Org1");
        let valued = created.with_value("150".parse().unwrap());
        let moved = valued.transferred_to("Bob".parse().unwrap(), "Org2".parse().unwrap());
        let mods = vec![
            write("tx1", 10, &created),
            write("tx2", 20, &valued),
            write("tx3", 30, &moved),
            delete("tx4", 40),
            write("tx5", 50, &created),
        ];
        let history = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap();
        let kinds: Vec<Change> = history
            .changes()
            .unwrap()
            .into_iter()
            .map(|(_, c)| c)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Change::Created,
                Change::ValueUpdated,
                Change::Transferred,
                Change::Deleted,
                Change::Created,
            ]
        );
        assert_eq!(history.current(), Some(&created));
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_commit_order_kept_despite_skewed_timestamps() {
        let first = asset("1", "Alice", "Org1");
        let second = asset("2", "Alice", "Org1");
        let mods = vec![write("tx1", 20, &first), write("tx2", 10, &second)];
        let history = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap();
        assert_eq!(history.entries()[0].tx_id, "tx1");
        assert_eq!(history.current(), Some(&second));

        let flagged: Vec<&str> = history.out_of_order().iter().map(|e| e.tx_id.as_str()).collect();
        assert_eq!(flagged, vec!["tx2"]);

        let changes = history.changes().unwrap();
        assert_eq!(changes[1].1, Change::ValueUpdated);
    }

    #[test]
    fn test_commit_order_kept_across_delete() {
        let a = asset("1", "Alice", "Org1");
        let mods = vec![write("tx1", 30, &a), delete("tx2", 5)];
        let history = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap();
        assert!(history.current().is_none());
        assert_eq!(history.out_of_order().len(), 1);
    }

    #[test]
    fn test_equal_timestamps_not_flagged() {
        let a = asset("1", "Alice", "Org1");
        let b = asset("2", "Alice", "Org1");
        let mods = vec![write("tx1", 10, &a), write("tx2", 10, &b)];
        let history = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap();
        assert!(history.out_of_order().is_empty());
    }

    #[test]
    fn test_changes_surface_key_mismatch() {
        let a = asset("1", "Alice", "Org1");
        let b = Asset::from_parts("asset2", "1", "Alice", "Org1").unwrap();
        let entry = |tx: &str, asset: &Asset| HistoryEntry {
            tx_id: tx.to_string(),
            timestamp: Timestamp::from_epoch(1, 0).unwrap(),
            asset: Some(asset.clone()),
        };
        let history = AssetHistory {
            key: key(),
            entries: vec![entry("tx1", &a), entry("tx2", &b)],
        };
        assert!(matches!(
            history.changes(),
            Err(RecordError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_deleted_history_has_no_current() {
        let a = asset("1", "Alice", "Org1");
        let mods = vec![write("tx1", 1, &a), delete("tx2", 2)];
        let history = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap();
        assert!(history.current().is_none());
        assert!(history.entries()[1].is_delete());
    }

    #[test]
    fn test_delete_ignores_value_bytes() {
        let mut m = delete("tx1", 1);
        m.value = b"garbage".to_vec();
        let entry = HistoryEntry::decode(&m, SchemaPolicy::Strict).unwrap();
        assert!(entry.is_delete());
    }

    #[test]
    fn test_malformed_entry_fails_whole_history() {
        let a = asset("1", "Alice", "Org1");
        let mut bad = write("tx2", 2, &a);
        bad.value = br#"{"ID":"asset1","Value":"1","Owner":"Alice"}"#.to_vec();
        let mods = vec![write("tx1", 1, &a), bad];
        let err = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_foreign_record_rejected() {
        let other = Asset::from_parts("asset9", "1", "Alice", "Org1").unwrap();
        let mods = vec![write("tx1", 1, &other)];
        let err = AssetHistory::from_modifications(key(), &mods, SchemaPolicy::Strict).unwrap_err();
        assert!(matches!(err, RecordError::KeyMismatch { .. }));
    }

    #[test]
    fn test_permissive_history_accepts_extra_fields() {
        let mut m = write("tx1", 1, &asset("1", "Alice", "Org1"));
        m.value = br#"{"ID":"asset1","Value":"1","Owner":"Alice","OwnerOrg":"Org1","docType":"asset"}"#.to_vec();
        assert!(AssetHistory::from_modifications(key(), [&m], SchemaPolicy::Strict).is_err());
        let history = AssetHistory::from_modifications(key(), [&m], SchemaPolicy::Permissive).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_empty_history() {
        let history = AssetHistory::from_modifications(
            key(),
            std::iter::empty::<&KeyModification>(),
            SchemaPolicy::Strict,
        ).unwrap();
        assert!(history.is_empty());
        assert!(history.changes().unwrap().is_empty());
        assert!(history.out_of_order().is_empty());
        assert_eq!(history.key().as_str(), "asset1");
    }

    #[test]
    fn test_change_display() {
        assert_eq!(Change::ValueUpdated.to_string(), "value_updated");
        assert_eq!(
            serde_json::to_string(&Change::Transferred).unwrap(),
            r#""transferred""#
        );
    }
}
