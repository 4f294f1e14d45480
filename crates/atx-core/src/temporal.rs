//! # Ledger Timestamps
//!
//! `Timestamp` is the commit time attached to each history entry. The ledger
//! reports it as seconds plus nanoseconds since the Unix epoch (a protobuf
//! `Timestamp`); this type keeps the full precision so that commits within
//! the same second still compare and render distinctly.
//!
//! Timestamps are always UTC. Rendering uses RFC 3339 with a `Z` suffix, and
//! [`Timestamp::parse()`] rejects any other offset so that rendered history
//! is stable across hosts.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::error::RecordError;

/// A UTC commit timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Build from the `seconds`/`nanos` pair a ledger history query reports.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidTimestamp`] if `nanos` is not below one
    /// billion or the instant is out of range.
    pub fn from_epoch(seconds: i64, nanos: u32) -> Result<Self, RecordError> {
        if nanos >= 1_000_000_000 {
            return Err(RecordError::InvalidTimestamp(format!(
                "nanos out of range: {nanos}"
            )));
        }
        DateTime::from_timestamp(seconds, nanos)
            .map(Self)
            .ok_or_else(|| {
                RecordError::InvalidTimestamp(format!("epoch seconds out of range: {seconds}"))
            })
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidTimestamp`] for malformed input or for
    /// any explicit offset, including `+00:00`.
    pub fn parse(s: &str) -> Result<Self, RecordError> {
        if !s.ends_with('Z') {
            return Err(RecordError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| RecordError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// RFC 3339 with `Z` suffix; fractional seconds only when non-zero.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Serialized in the same RFC 3339 form as `Display`.
impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}
