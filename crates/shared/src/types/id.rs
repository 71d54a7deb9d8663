//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `TransactionId` where an
//! `AccountId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers over store-assigned keys.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wraps a raw store-assigned key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

typed_id!(AccountId, "Unique identifier for an account.");
typed_id!(
    TransactionId,
    "Unique identifier for a recorded transaction."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_and_parse() {
        let id = AccountId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(AccountId::from_str("42").unwrap(), id);
        assert!(AccountId::from_str("forty-two").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = TransactionId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        assert_eq!(serde_json::from_str::<TransactionId>("7").unwrap(), id);
    }

    #[test]
    fn test_ordering_on_raw_key() {
        let mut ids = vec![AccountId::new(3), AccountId::new(1), AccountId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![AccountId::new(1), AccountId::new(2), AccountId::new(3)]);
    }
}
