//! # Error Types
//!
//! Errors produced by the asset record crate. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Decoding failures are always [`RecordError::MalformedRecord`], carrying
//!   the offending field or the reason the document was rejected.
//! - Construction never fails at the `Asset` level. Empty arguments are
//!   rejected earlier, by the field newtypes, with [`ValidationError`].

use thiserror::Error;

/// Top-level error type for asset record operations.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The byte stream does not encode a valid asset record.
    #[error("malformed asset record: {0}")]
    MalformedRecord(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A history timestamp could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A digest string is not 64 hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A history entry decoded to a record stored under a different ID.
    #[error("history for key {expected:?} contains record {found:?}")]
    KeyMismatch {
        /// The key the history was queried for.
        expected: String,
        /// The ID found in the decoded record.
        found: String,
    },
}

impl RecordError {
    /// Returns true if this is a shape-validation failure on decode.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord(_))
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A field value rejected by its validating constructor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Every record field must be a non-empty string.
    #[error("{field} must be a non-empty string")]
    EmptyField {
        /// Wire name of the field (`ID`, `Value`, `Owner`, `OwnerOrg`).
        field: &'static str,
    },
}
