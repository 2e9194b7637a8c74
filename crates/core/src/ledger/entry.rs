//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use topup_shared::types::{LedgerEntryId, MinorUnits, PaymentMethodId, UserId};

/// Why a ledger entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// The zero-balance entry written when the ledger is opened.
    Active,
    /// A balance produced by a reconciled top-up.
    Topup,
}

impl EntryStatus {
    /// Returns the storage/wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Topup => "topup",
        }
    }
}

/// An immutable snapshot of a user's balance.
///
/// `amount` is the running total after this entry, not a delta. The entry
/// with the greatest `id` for a user is that user's current balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Database-assigned, strictly increasing identifier.
    pub id: LedgerEntryId,
    /// Owner of the entry.
    pub user_id: UserId,
    /// Per-user sequence number, 1 for the opening entry.
    pub version: i64,
    /// Running balance after this entry.
    pub amount: MinorUnits,
    /// Why the entry exists.
    pub status: EntryStatus,
    /// Top-up request that produced this entry, if any.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A validated entry that is ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// Owner of the entry.
    pub user_id: UserId,
    /// Per-user sequence number to claim.
    pub version: i64,
    /// Running balance after this entry.
    pub amount: MinorUnits,
    /// Why the entry exists.
    pub status: EntryStatus,
    /// Top-up request that produced this entry, if any.
    pub payment_method_id: Option<PaymentMethodId>,
}
