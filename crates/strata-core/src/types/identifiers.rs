//! The three-tier identity scheme plus snapshot ids.
//!
//! - Physical: fresh UUID v4 per record occurrence. Database primary key.
//! - Semantic: SHA-256 of the role tuple. Stable while the role is unchanged.
//! - Content: SHA-256 of the normalized implementation. Stable under moves.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id! {
    /// Per-occurrence identity; unique across all records ever minted.
    PhysicalId
}

string_id! {
    /// Role identity: same file, scope, kind, name, and arity hash equal.
    SemanticId
}

string_id! {
    /// Implementation identity: same normalized body and parameter shapes
    /// hash equal regardless of location.
    ContentId
}

string_id! {
    /// Snapshot identity (UUID v4).
    SnapshotId
}

impl PhysicalId {
    /// Mint a fresh physical id.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl SnapshotId {
    /// Mint a fresh snapshot id.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Short display form (first 8 characters).
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_physical_ids_are_unique() {
        let a = PhysicalId::mint();
        let b = PhysicalId::mint();
        assert_ne!(a, b);
    }

    #[test]
    fn snapshot_short_form() {
        let id = SnapshotId::new("a1b2c3d4e5f6");
        assert_eq!(id.short(), "a1b2c3d4");
    }
}
