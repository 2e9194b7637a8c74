//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every operation reports failures as [`LedgerError`].

pub mod ledger;
pub mod payment_method;
pub mod query;
pub mod reconciliation;

pub use ledger::LedgerRepository;
pub use payment_method::PaymentMethodRepository;
pub use query::BalanceQuery;
pub use reconciliation::{ReconciliationOutcome, ReconciliationRepository};

use sea_orm::{DatabaseTransaction, DbErr, RuntimeErr, SqlErr};
use topup_core::ledger::{EntryStatus, LedgerEntry, LedgerError};
use topup_core::topup::{PaymentMethod, PaymentStatus};
use topup_shared::types::{LedgerEntryId, MinorUnits, PaymentMethodId, UserId};
use tracing::warn;

use crate::entities::{ledger_entries, payment_methods, sea_orm_active_enums};

/// Maps a database error, turning unique-index violations and lock
/// contention into `on_conflict`.
pub(crate) fn map_db_err(err: DbErr, on_conflict: impl FnOnce() -> LedgerError) -> LedgerError {
    if is_contention(&err) || matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return on_conflict();
    }
    LedgerError::Database(err.to_string())
}

/// Returns true if the database refused a statement because a concurrent
/// transaction holds a conflicting lock or snapshot.
fn is_contention(err: &DbErr) -> bool {
    let (DbErr::Conn(RuntimeErr::SqlxError(e))
    | DbErr::Exec(RuntimeErr::SqlxError(e))
    | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };
    let Some(code) = e.as_database_error().and_then(|db| db.code()) else {
        return false;
    };
    is_contention_code(&code)
}

fn is_contention_code(code: &str) -> bool {
    match code {
        // Postgres serialization_failure and deadlock_detected.
        "40001" | "40P01" => true,
        // SQLite extended result codes keep the primary code in the low byte:
        // SQLITE_BUSY (5) and SQLITE_LOCKED (6).
        other => other
            .parse::<i32>()
            .is_ok_and(|extended| matches!(extended & 0xff, 5 | 6)),
    }
}

/// Commits `txn` when `result` is `Ok` and rolls it back otherwise.
///
/// A failed commit is mapped with `on_conflict` like any other write.
pub(crate) async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, LedgerError>,
    on_conflict: impl FnOnce() -> LedgerError,
) -> Result<T, LedgerError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(|e| map_db_err(e, on_conflict))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Maps a database error with no expected conflict.
pub(crate) fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

fn user_id_from_db(raw: i64) -> Result<UserId, LedgerError> {
    UserId::try_from(raw).map_err(|_| LedgerError::CorruptRecord(format!("user id {raw} out of range")))
}

impl From<sea_orm_active_enums::EntryStatus> for EntryStatus {
    fn from(status: sea_orm_active_enums::EntryStatus) -> Self {
        match status {
            sea_orm_active_enums::EntryStatus::Active => Self::Active,
            sea_orm_active_enums::EntryStatus::Topup => Self::Topup,
        }
    }
}

impl From<EntryStatus> for sea_orm_active_enums::EntryStatus {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Active => Self::Active,
            EntryStatus::Topup => Self::Topup,
        }
    }
}

impl From<sea_orm_active_enums::PaymentStatus> for PaymentStatus {
    fn from(status: sea_orm_active_enums::PaymentStatus) -> Self {
        match status {
            sea_orm_active_enums::PaymentStatus::Pending => Self::Pending,
            sea_orm_active_enums::PaymentStatus::Success => Self::Success,
        }
    }
}

impl From<PaymentStatus> for sea_orm_active_enums::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Success => Self::Success,
        }
    }
}

impl TryFrom<ledger_entries::Model> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(model: ledger_entries::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LedgerEntryId::new(model.id),
            user_id: user_id_from_db(model.user_id)?,
            version: model.version,
            amount: MinorUnits::new(model.amount),
            status: model.status.into(),
            payment_method_id: model.payment_method_id.map(PaymentMethodId::new),
            created_at: model.created_at.to_utc(),
        })
    }
}

impl TryFrom<payment_methods::Model> for PaymentMethod {
    type Error = LedgerError;

    fn try_from(model: payment_methods::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentMethodId::new(model.id),
            user_id: user_id_from_db(model.user_id)?,
            holder_name: model.holder_name,
            va: model.va,
            nominal: MinorUnits::new(model.nominal),
            status: model.status.into(),
            created_at: model.created_at.to_utc(),
            updated_at: model.updated_at.to_utc(),
        })
    }
}

/// Converts a batch of models, failing on the first corrupt one.
pub(crate) fn convert_all<M, T>(models: Vec<M>) -> Result<Vec<T>, LedgerError>
where
    T: TryFrom<M, Error = LedgerError>,
{
    models.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contention_codes() {
        assert!(is_contention_code("5"));
        assert!(is_contention_code("517"));
        assert!(is_contention_code("6"));
        assert!(is_contention_code("262"));
        assert!(is_contention_code("40001"));
        assert!(is_contention_code("40P01"));
        assert!(!is_contention_code("2067"));
        assert!(!is_contention_code("23505"));
        assert!(!is_contention_code("1"));
    }

    #[test]
    fn test_unrelated_errors_are_storage() {
        let err = map_db_err(DbErr::Custom("boom".to_string()), || {
            LedgerError::ConcurrentAppend(UserId::new(1))
        });
        assert!(matches!(err, LedgerError::Database(_)));
    }
}
