//! # Asset Record
//!
//! The canonical shape of one ledger-tracked asset, as stored in world state
//! and returned by history queries.
//!
//! ## Wire Shape
//!
//! A JSON object with exactly four non-empty string fields, `ID`, `Value`,
//! `Owner`, `OwnerOrg`. Stored bytes are always produced by
//! [`Asset::to_canonical_bytes()`] (JCS, sorted keys), so equal records encode
//! to identical bytes:
//!
//! ```text
//! {"ID":"asset1","Owner":"Alice","OwnerOrg":"Org1","Value":"100"}
//! ```
//!
//! ## Value Semantics
//!
//! `Asset` is an immutable value. Fields are private; the ID has no setter,
//! and Owner/OwnerOrg can only be replaced together through
//! [`Asset::transferred_to()`]. Every update yields a new `Asset` which the
//! transaction layer writes back as a whole-record replacement.
//!
//! ## Equality
//!
//! `==` compares all four fields; it is what history and audit comparisons
//! use. Ledger identity is the ID alone, available as [`Asset::same_asset()`].

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, StateDigest};
use crate::error::{RecordError, ValidationError};
use crate::identity::{AssetId, AssetValue, OrgId, OwnerId, StateKey};

/// Top-level keys of a serialized asset, in canonical order.
pub const FIELD_NAMES: [&str; 4] = [
    AssetId::FIELD,
    OwnerId::FIELD,
    OrgId::FIELD,
    AssetValue::FIELD,
];

/// How decoding treats top-level keys outside [`FIELD_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Reject any unexpected key. Guards against corrupted or adversarial
    /// state being accepted as a valid record.
    #[default]
    Strict,
    /// Ignore unexpected keys, for readers that must tolerate records
    /// written by a newer schema. Required fields are still enforced.
    Permissive,
}

/// A transferable, ownable asset recorded on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    #[serde(rename = "ID")]
    id: AssetId,
    #[serde(rename = "Value")]
    value: AssetValue,
    #[serde(rename = "Owner")]
    owner: OwnerId,
    #[serde(rename = "OwnerOrg")]
    owner_org: OrgId,
}

impl Asset {
    /// Construct an asset from validated fields. Fields are stored as given.
    pub fn new(id: AssetId, value: AssetValue, owner: OwnerId, owner_org: OrgId) -> Self {
        Self {
            id,
            value,
            owner,
            owner_org,
        }
    }

    /// Construct an asset from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] naming the first empty argument.
    pub fn from_parts(
        id: impl Into<String>,
        value: impl Into<String>,
        owner: impl Into<String>,
        owner_org: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            AssetId::new(id)?,
            AssetValue::new(value)?,
            OwnerId::new(owner)?,
            OrgId::new(owner_org)?,
        ))
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn value(&self) -> &AssetValue {
        &self.value
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn owner_org(&self) -> &OrgId {
        &self.owner_org
    }

    /// The world-state key this record is stored under.
    pub fn state_key(&self) -> StateKey {
        self.id.state_key()
    }

    /// True if both records describe the same ledger asset (same ID),
    /// regardless of value or ownership.
    pub fn same_asset(&self, other: &Asset) -> bool {
        self.id == other.id
    }

    /// A copy of this asset carrying a new value payload.
    pub fn with_value(&self, value: AssetValue) -> Asset {
        Asset {
            value,
            ..self.clone()
        }
    }

    /// A copy of this asset owned by `owner` of `owner_org`.
    pub fn transferred_to(&self, owner: OwnerId, owner_org: OrgId) -> Asset {
        Asset {
            owner,
            owner_org,
            ..self.clone()
        }
    }

    /// Serialize to the canonical bytes written to world state.
    pub fn to_canonical_bytes(&self) -> Result<CanonicalBytes, RecordError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// SHA-256 digest of the canonical bytes.
    pub fn state_digest(&self) -> Result<StateDigest, RecordError> {
        Ok(sha256_digest(&self.to_canonical_bytes()?))
    }

    /// Decode stored bytes under the [`SchemaPolicy::Strict`] policy.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedRecord`] if the bytes are not a JSON
    /// object holding exactly the four fields as non-empty strings.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RecordError> {
        Self::from_slice_with(bytes, SchemaPolicy::Strict)
    }

    /// Decode stored bytes under an explicit unknown-field policy.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedRecord`] if the bytes are not a JSON
    /// object, if any required field is missing, empty, not a string, or
    /// repeated, or (under [`SchemaPolicy::Strict`]) if any other top-level
    /// key is present.
    pub fn from_slice_with(bytes: &[u8], policy: SchemaPolicy) -> Result<Self, RecordError> {
        let entries: TopLevelEntries = serde_json::from_slice(bytes)
            .map_err(|e| RecordError::MalformedRecord(format!("invalid record document: {e}")))?;
        Self::from_entries(entries, policy)
    }

    fn from_entries(entries: TopLevelEntries, policy: SchemaPolicy) -> Result<Self, RecordError> {
        let mut map = Map::new();
        for (key, value) in entries.0 {
            if !FIELD_NAMES.contains(&key.as_str()) {
                match policy {
                    SchemaPolicy::Strict => {
                        return Err(RecordError::MalformedRecord(format!(
                            "unexpected field `{key}`"
                        )));
                    }
                    SchemaPolicy::Permissive => continue,
                }
            }
            // Repeated schema keys are rejected under either policy.
            if map.contains_key(&key) {
                return Err(RecordError::MalformedRecord(format!(
                    "duplicate field `{key}`"
                )));
            }
            map.insert(key, value);
        }

        Ok(Self {
            id: take_field(&mut map, AssetId::FIELD)?,
            value: take_field(&mut map, AssetValue::FIELD)?,
            owner: take_field(&mut map, OwnerId::FIELD)?,
            owner_org: take_field(&mut map, OrgId::FIELD)?,
        })
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = TopLevelEntries::deserialize(deserializer)?;
        Self::from_entries(entries, SchemaPolicy::Strict).map_err(serde::de::Error::custom)
    }
}

/// Top-level object entries in document order, repeated keys included.
struct TopLevelEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for TopLevelEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = TopLevelEntries;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries =
                    Vec::with_capacity(access.size_hint().unwrap_or(FIELD_NAMES.len()));
                while let Some(entry) = access.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(TopLevelEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (value {}, owner {}@{})",
            self.id, self.value, self.owner, self.owner_org
        )
    }
}

fn take_field<T>(map: &mut Map<String, Value>, name: &'static str) -> Result<T, RecordError>
where
    T: TryFrom<String, Error = ValidationError>,
{
    match map.remove(name) {
        None => Err(RecordError::MalformedRecord(format!(
            "missing field `{name}`"
        ))),
        Some(Value::String(s)) => T::try_from(s)
            .map_err(|e| RecordError::MalformedRecord(e.to_string())),
        Some(other) => Err(RecordError::MalformedRecord(format!(
            "field `{name}` must be a string, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
