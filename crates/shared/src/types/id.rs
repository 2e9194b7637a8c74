//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `LedgerEntryId` where a
//! `PaymentMethodId` is expected. All ids are numeric: users come from the
//! identity provider as `u32`, stored rows use database sequences.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers over an integer.
macro_rules! typed_id {
    ($name:ident, $inner:ty, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates an ID from its raw value.
            #[must_use]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn into_inner(self) -> $inner {
                self.0
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

typed_id!(UserId, u32, "Identifier of an already-authenticated user.");
typed_id!(LedgerEntryId, i64, "Unique identifier for a ledger entry.");
typed_id!(PaymentMethodId, i64, "Unique identifier for a top-up request.");

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        Self::from(id.0)
    }
}

impl TryFrom<i64> for UserId {
    type Error = std::num::TryFromIntError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display_and_parse() {
        let id: UserId = "42".parse().unwrap();
        assert_eq!(id, UserId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("-1".parse::<UserId>().is_err());
    }

    #[test]
    fn test_user_id_storage_conversion() {
        let stored = i64::from(UserId::new(u32::MAX));
        assert_eq!(UserId::try_from(stored).unwrap(), UserId::new(u32::MAX));
        assert!(UserId::try_from(-5_i64).is_err());
        assert!(UserId::try_from(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&LedgerEntryId::new(9)).unwrap();
        assert_eq!(json, "9");
        let id: PaymentMethodId = serde_json::from_str("12").unwrap();
        assert_eq!(id.into_inner(), 12);
    }
}
