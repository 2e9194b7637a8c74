//! Status columns stored as short strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `ledger_entries.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EntryStatus {
    /// Opening entry.
    #[sea_orm(string_value = "active")]
    Active,
    /// Reconciled top-up.
    #[sea_orm(string_value = "topup")]
    Topup,
}

/// `payment_methods.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentStatus {
    /// Waiting for reconciliation.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Credited.
    #[sea_orm(string_value = "success")]
    Success,
}
