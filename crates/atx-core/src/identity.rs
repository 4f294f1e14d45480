//! # Record Field Newtypes
//!
//! One newtype per asset record field. Each is a distinct type, so an owner
//! cannot be passed where an organization is expected, and each rejects the
//! empty string at construction.
//!
//! ## Validation
//!
//! Values are stored exactly as given: no trimming, case-folding, or other
//! normalization. The only rule is non-emptiness. `Deserialize` routes
//! through the same constructor, so an empty string in stored bytes is
//! rejected at decode time rather than silently accepted.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Implements the non-empty string newtype surface for a record field.
macro_rules! non_empty_field {
    ($(#[$meta:meta])* $ty:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $ty(String);

        impl $ty {
            /// Wire name of the field this type occupies.
            pub const FIELD: &'static str = $field;

            /// Create the field value, rejecting the empty string.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::EmptyField`] if `value` is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if s.is_empty() {
                    return Err(ValidationError::EmptyField { field: Self::FIELD });
                }
                Ok(Self(s))
            }

            /// Access the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the newtype, yielding the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

non_empty_field!(
    /// Unique key of an asset within world state. Assigned once at creation.
    AssetId,
    "ID"
);

non_empty_field!(
    /// Opaque, application-defined value payload.
    AssetValue,
    "Value"
);

non_empty_field!(
    /// Identifier of the principal that currently owns an asset.
    OwnerId,
    "Owner"
);

non_empty_field!(
    /// Identifier of the organization the current owner belongs to.
    OrgId,
    "OwnerOrg"
);

impl AssetId {
    /// The world-state key this asset is stored under.
    pub fn state_key(&self) -> StateKey {
        StateKey(self.0.clone())
    }
}

/// World-state key of an asset record.
///
/// The chaincode stores each asset under its plain ID, so the key is the
/// ID's UTF-8 bytes. It can only be obtained from an [`AssetId`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(String);

impl StateKey {
    /// Access the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Access the key bytes as handed to the state store.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&AssetId> for StateKey {
    fn from(id: &AssetId) -> Self {
        id.state_key()
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
