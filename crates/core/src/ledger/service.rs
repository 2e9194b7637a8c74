//! Ledger service for entry validation and balance arithmetic.
//!
//! This module provides the rules applied before an entry is persisted. It
//! never touches storage: callers hand it the latest entry they read inside
//! their own transaction.

use topup_shared::types::{MinorUnits, PaymentMethodId, UserId};

use super::entry::{EntryStatus, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;

/// Version of the first entry in every user's ledger.
pub const FIRST_VERSION: i64 = 1;

/// Maximum number of entries returned by history queries.
pub const HISTORY_LIMIT: u64 = 100;

/// Stateless ledger rules.
pub struct LedgerService;

impl LedgerService {
    /// Builds the zero-balance entry that opens a user's ledger.
    #[must_use]
    pub const fn opening_entry(user_id: UserId) -> NewLedgerEntry {
        NewLedgerEntry {
            user_id,
            version: FIRST_VERSION,
            amount: MinorUnits::ZERO,
            status: EntryStatus::Active,
            payment_method_id: None,
        }
    }

    /// Builds the entry that follows `latest` in the user's ledger.
    ///
    /// `amount` is the new running total. Monotonicity is the caller's
    /// concern; only the sign is checked here.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` if `amount` is below zero.
    pub fn next_entry(
        user_id: UserId,
        latest: Option<&LedgerEntry>,
        amount: MinorUnits,
        status: EntryStatus,
        payment_method_id: Option<PaymentMethodId>,
    ) -> Result<NewLedgerEntry, LedgerError> {
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount(amount));
        }

        let version = latest.map_or(FIRST_VERSION, |entry| entry.version + 1);

        Ok(NewLedgerEntry {
            user_id,
            version,
            amount,
            status,
            payment_method_id,
        })
    }

    /// Adds a top-up nominal to a running balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the nominal is not positive, the balance is
    /// negative, or the sum overflows.
    pub fn credit(balance: MinorUnits, nominal: MinorUnits) -> Result<MinorUnits, LedgerError> {
        if !nominal.is_positive() {
            return Err(LedgerError::NonPositiveNominal(nominal));
        }
        if balance.is_negative() {
            return Err(LedgerError::NegativeAmount(balance));
        }

        balance
            .checked_add(nominal)
            .ok_or(LedgerError::BalanceOverflow { balance, nominal })
    }
}
