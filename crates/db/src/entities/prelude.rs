//! Entity re-exports.

pub use super::ledger_entries::Entity as LedgerEntries;
pub use super::payment_methods::Entity as PaymentMethods;
