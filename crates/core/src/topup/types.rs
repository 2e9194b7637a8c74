//! Payment method domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use topup_shared::types::{MinorUnits, PaymentMethodId, UserId};

/// Settlement state of a top-up request.
///
/// `Pending -> Success` is the only transition. A request that is never
/// reconciled stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Issued, waiting for the transfer to be confirmed.
    Pending,
    /// Credited to the ledger.
    Success,
}

impl PaymentStatus {
    /// Returns the storage/wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A top-up request addressed by its virtual account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Database-assigned identifier.
    pub id: PaymentMethodId,
    /// Owner of the request.
    pub user_id: UserId,
    /// Name shown on the virtual account.
    pub holder_name: String,
    /// Virtual-account reference, globally unique.
    pub va: String,
    /// Requested top-up amount.
    pub nominal: MinorUnits,
    /// Settlement state.
    pub status: PaymentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Input for issuing a virtual account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueVaInput {
    /// Requesting user.
    pub user_id: UserId,
    /// Requested nominal, already parsed.
    pub nominal: MinorUnits,
    /// Name to show on the virtual account.
    pub holder_name: String,
}

/// A validated payment method that is ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentMethod {
    /// Owner of the request.
    pub user_id: UserId,
    /// Trimmed holder name.
    pub holder_name: String,
    /// Generated virtual-account reference.
    pub va: String,
    /// Requested top-up amount.
    pub nominal: MinorUnits,
    /// Always `Pending` on creation.
    pub status: PaymentStatus,
}
