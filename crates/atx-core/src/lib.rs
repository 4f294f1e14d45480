//! # atx-core — Canonical Asset Record
//!
//! The schema contract between asset-transfer chaincode and the ledger's
//! key-value world state. Every read, write, and history query for an asset
//! serializes to and deserializes from the [`Asset`] shape defined here.
//!
//! ## Key Design Principles
//!
//! 1. **Validated field newtypes.** `AssetId`, `AssetValue`, `OwnerId`,
//!    `OrgId` reject the empty string at construction and at decode time.
//!    An `Asset` can only be built from them, so every in-memory record is
//!    valid.
//!
//! 2. **Value semantics.** Updates return a new `Asset`. The ID never
//!    changes, and Owner/OwnerOrg are only replaced as a pair.
//!
//! 3. **`CanonicalBytes` for stored state.** Records are written as JCS
//!    (RFC 8785) JSON, so equal records always produce identical bytes and
//!    identical [`StateDigest`]s.
//!
//! 4. **Strict decoding by default.** Missing, empty, mistyped, or unknown
//!    fields fail with [`RecordError::MalformedRecord`]. Readers that must
//!    tolerate newer writers opt in to [`SchemaPolicy::Permissive`].
//!
//! ## Crate Policy
//!
//! - No I/O, no logging, no shared mutable state. All types are `Send + Sync`.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Transaction orchestration, endorsement, and concurrency control belong
//!   to the ledger platform and the chaincode transaction layer.

pub mod asset;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod history;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use asset::{Asset, SchemaPolicy, FIELD_NAMES};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, StateDigest};
pub use error::{CanonicalizationError, RecordError, ValidationError};
pub use history::{AssetHistory, Change, HistoryEntry, KeyModification};
pub use identity::{AssetId, AssetValue, OrgId, OwnerId, StateKey};
pub use temporal::Timestamp;
