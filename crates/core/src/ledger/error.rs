//! Ledger error types for validation, lookup, storage, and concurrency errors.
//!
//! Every failure surfaced by the ledger and top-up operations is a
//! `LedgerError`. Each variant belongs to exactly one [`ErrorKind`], which
//! decides its response class; `error_code()` names the variant itself.

use thiserror::Error;
use topup_shared::types::{MinorUnits, PaymentMethodId, UserId};

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Missing balance, payment method, or VA.
    NotFound,
    /// Persistence failure.
    Storage,
    /// Lost a race against a concurrent writer.
    Conflict,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Nominal is not an integer literal.
    #[error("Nominal '{0}' is not a valid integer amount")]
    MalformedNominal(String),

    /// Nominal must be strictly positive.
    #[error("Nominal must be positive, got {0}")]
    NonPositiveNominal(MinorUnits),

    /// Ledger amounts are running totals and cannot be negative.
    #[error("Ledger amount cannot be negative, got {0}")]
    NegativeAmount(MinorUnits),

    /// Crediting the nominal would overflow the balance.
    #[error("Crediting {nominal} to balance {balance} overflows")]
    BalanceOverflow {
        /// Balance before the credit.
        balance: MinorUnits,
        /// Nominal being credited.
        nominal: MinorUnits,
    },

    /// Holder name is blank or too long.
    #[error("Invalid holder name: {0}")]
    InvalidHolderName(String),

    // ========== Not Found Errors ==========
    /// User has no ledger entries.
    #[error("No balance found for user {0}")]
    BalanceNotFound(UserId),

    /// No payment method with this VA for this user.
    #[error("Virtual account not found: {0}")]
    VirtualAccountNotFound(String),

    /// A settled payment method has no ledger entry linked to it.
    #[error("No ledger entry recorded for payment method {0}")]
    SettlementEntryNotFound(PaymentMethodId),

    // ========== Concurrency Errors ==========
    /// Another append for the same user won the race.
    #[error("Concurrent ledger append for user {0}, please retry")]
    ConcurrentAppend(UserId),

    /// Another reconciliation settled this VA first.
    #[error("Virtual account {0} was reconciled concurrently")]
    ConcurrentReconciliation(String),

    /// Generated VA already exists.
    #[error("Virtual account {0} already issued")]
    DuplicateVirtualAccount(String),

    // ========== Storage Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Stored data cannot be mapped back to the domain.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl LedgerError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedNominal(_)
            | Self::NonPositiveNominal(_)
            | Self::NegativeAmount(_)
            | Self::BalanceOverflow { .. }
            | Self::InvalidHolderName(_) => ErrorKind::Validation,
            Self::BalanceNotFound(_)
            | Self::VirtualAccountNotFound(_)
            | Self::SettlementEntryNotFound(_) => ErrorKind::NotFound,
            Self::ConcurrentAppend(_)
            | Self::ConcurrentReconciliation(_)
            | Self::DuplicateVirtualAccount(_) => ErrorKind::Conflict,
            Self::Database(_) | Self::CorruptRecord(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedNominal(_) => "MALFORMED_NOMINAL",
            Self::NonPositiveNominal(_) => "NON_POSITIVE_NOMINAL",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            Self::InvalidHolderName(_) => "INVALID_HOLDER_NAME",
            Self::BalanceNotFound(_) => "BALANCE_NOT_FOUND",
            Self::VirtualAccountNotFound(_) => "VIRTUAL_ACCOUNT_NOT_FOUND",
            Self::SettlementEntryNotFound(_) => "SETTLEMENT_ENTRY_NOT_FOUND",
            Self::ConcurrentAppend(_) => "CONCURRENT_APPEND",
            Self::ConcurrentReconciliation(_) => "CONCURRENT_RECONCILIATION",
            Self::DuplicateVirtualAccount(_) => "DUPLICATE_VIRTUAL_ACCOUNT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::CorruptRecord(_) => "CORRUPT_RECORD",
        }
    }

    /// Returns the HTTP status code the API answers this error with.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Storage => 500,
        }
    }

    /// Returns true if retrying the same call can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LedgerError::MalformedNominal("abc".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::BalanceNotFound(UserId::new(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::ConcurrentReconciliation("va".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LedgerError::Database("boom".into()).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::NonPositiveNominal(MinorUnits::new(-10)).http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::VirtualAccountNotFound("1".into()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::ConcurrentAppend(UserId::new(1)).http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::CorruptRecord("x".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentAppend(UserId::new(1)).is_retryable());
        assert!(LedgerError::DuplicateVirtualAccount("1".into()).is_retryable());
        assert!(!LedgerError::BalanceNotFound(UserId::new(1)).is_retryable());
        assert!(!LedgerError::Database("x".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::BalanceOverflow {
            balance: MinorUnits::new(i64::MAX),
            nominal: MinorUnits::new(1),
        };
        assert_eq!(
            err.to_string(),
            format!("Crediting 1 to balance {} overflows", i64::MAX)
        );
    }
}
