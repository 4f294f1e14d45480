//! # State Digest
//!
//! SHA-256 over the canonical bytes of a record. Peers and auditors compare
//! these to confirm that two copies of world state hold the same record
//! without shipping the record itself.
//!
//! [`sha256_digest()`] accepts only `&CanonicalBytes`, so a digest can never be
//! taken over a non-canonical encoding of the same fields.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::RecordError;

const SHA256_PREFIX: &str = "sha256:";

/// A 32-byte SHA-256 digest of canonical record bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateDigest([u8; 32]);

impl StateDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for StateDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SHA256_PREFIX}{}", self.to_hex())
    }
}

impl FromStr for StateDigest {
    type Err = RecordError;

    /// Parse `sha256:<64 hex>` or a bare 64-character hex string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix(SHA256_PREFIX).unwrap_or(s);
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RecordError::InvalidDigest(format!(
                "digest must be 64 hex characters, got {s:?}"
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
                RecordError::InvalidDigest(format!("digest is not hex: {s:?}"))
            })?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for StateDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 state digest of canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> StateDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    StateDigest(bytes)
}
