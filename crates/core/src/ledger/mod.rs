//! Append-only balance ledger.
//!
//! This module implements the core ledger functionality:
//! - Ledger entries (running balances, never updated)
//! - Balance statements rebuilt from stored entries
//! - Error types for ledger and top-up operations
//! - Ledger service for entry validation and credit arithmetic

pub mod balance;
pub mod entry;
pub mod error;
pub mod service;

#[cfg(test)]
mod service_props;

pub use balance::{BalanceStatement, StatementLine};
pub use entry::{EntryStatus, LedgerEntry, NewLedgerEntry};
pub use error::{ErrorKind, LedgerError};
pub use service::{FIRST_VERSION, HISTORY_LIMIT, LedgerService};
