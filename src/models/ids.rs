//! Strongly-typed ID wrappers for all entity types
//!
//! Newtype wrappers keep a child's ID from being passed where an invoice ID
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Whether `s` is this ID's full UUID, its display form, or a
            /// prefix of either (at least 4 characters)
            pub fn matches(&self, s: &str) -> bool {
                let s = s.trim().to_lowercase();
                let full = self.0.to_string();
                let bare = s.strip_prefix($display_prefix).unwrap_or(s.as_str());
                bare.len() >= 4 && full.starts_with(bare)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ChildId, "chd-");
define_id!(GuardianId, "gdn-");
define_id!(ContactId, "emc-");
define_id!(DocumentId, "doc-");
define_id!(InvoiceId, "inv-");
define_id!(PaymentId, "pay-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = ChildId::new();
        let display = id.to_string();
        assert!(display.starts_with("chd-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_id_matches_short_form() {
        let id = InvoiceId::new();
        assert!(id.matches(&id.to_string()));
        assert!(id.matches(&id.as_uuid().to_string()));
        assert!(!id.matches("inv-"));
        assert!(!id.matches("zzzz"));
    }

    #[test]
    fn test_id_parse_with_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: PaymentId = format!("pay-{}", uuid_str).parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_id_serialization() {
        let id = GuardianId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: GuardianId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
