//! Ledger repository: the append-only store of balance entries.
//!
//! Entries are only ever inserted. The helpers taking a generic connection are
//! shared with the reconciliation repository and the read-only queries.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use topup_core::ledger::{
    EntryStatus, HISTORY_LIMIT, LedgerEntry, LedgerError, LedgerService, NewLedgerEntry,
};
use topup_shared::types::{MinorUnits, UserId};
use tracing::{debug, info};

use super::{convert_all, db_err, finish, map_db_err};
use crate::entities::{ledger_entries, sea_orm_active_enums};

/// Ledger repository for balance entries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a user's ledger with a zero-balance `active` entry.
    ///
    /// Idempotent: if the user already has entries the latest one is returned
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn open_account(&self, user_id: UserId) -> Result<LedgerEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(existing) = latest_entry(&txn, user_id).await? {
            finish(txn, Ok(()), || LedgerError::ConcurrentAppend(user_id)).await?;
            debug!(user_id = %user_id, "Ledger already open");
            return Ok(existing);
        }

        let inserted = insert_entry(&txn, LedgerService::opening_entry(user_id)).await;
        match finish(txn, inserted, || LedgerError::ConcurrentAppend(user_id)).await {
            Ok(entry) => {
                info!(user_id = %user_id, entry_id = %entry.id, "Opened ledger");
                Ok(entry)
            }
            // A concurrent open claimed version 1.
            Err(LedgerError::ConcurrentAppend(_)) => latest_entry(&self.db, user_id)
                .await?
                .ok_or(LedgerError::ConcurrentAppend(user_id)),
            Err(e) => Err(e),
        }
    }

    /// Appends an entry carrying `amount` as the new running balance.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAmount` for a negative amount and `ConcurrentAppend`
    /// if another append for the same user committed first or holds the
    /// write lock.
    pub async fn append_entry(
        &self,
        user_id: UserId,
        amount: MinorUnits,
        status: EntryStatus,
    ) -> Result<LedgerEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let result = append_in(&txn, user_id, amount, status).await;
        finish(txn, result, || LedgerError::ConcurrentAppend(user_id)).await
    }
}

async fn append_in(
    txn: &DatabaseTransaction,
    user_id: UserId,
    amount: MinorUnits,
    status: EntryStatus,
) -> Result<LedgerEntry, LedgerError> {
    let latest = latest_entry(txn, user_id).await?;
    let new_entry = LedgerService::next_entry(user_id, latest.as_ref(), amount, status, None)?;
    insert_entry(txn, new_entry).await
}

/// Reads the entry with the greatest id for a user.
pub(crate) async fn latest_entry<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<Option<LedgerEntry>, LedgerError> {
    ledger_entries::Entity::find()
        .filter(ledger_entries::Column::UserId.eq(i64::from(user_id)))
        .order_by_desc(ledger_entries::Column::Id)
        .limit(1)
        .one(conn)
        .await
        .map_err(db_err)?
        .map(LedgerEntry::try_from)
        .transpose()
}

/// Reads the non-`active` entries for a user, newest first, capped.
pub(crate) async fn history_entries<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<Vec<LedgerEntry>, LedgerError> {
    let models = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::UserId.eq(i64::from(user_id)))
        .filter(ledger_entries::Column::Status.ne(sea_orm_active_enums::EntryStatus::Active))
        .order_by_desc(ledger_entries::Column::Id)
        .limit(HISTORY_LIMIT)
        .all(conn)
        .await
        .map_err(db_err)?;

    convert_all(models)
}

/// Inserts a validated entry.
///
/// A unique violation on `(user_id, version)` or `payment_method_id`, or a
/// lock held by another writer, means a concurrent writer got there first.
pub(crate) async fn insert_entry<C: ConnectionTrait>(
    conn: &C,
    entry: NewLedgerEntry,
) -> Result<LedgerEntry, LedgerError> {
    let user_id = entry.user_id;

    let model = ledger_entries::ActiveModel {
        user_id: Set(i64::from(entry.user_id)),
        version: Set(entry.version),
        amount: Set(entry.amount.value()),
        status: Set(entry.status.into()),
        payment_method_id: Set(entry.payment_method_id.map(|id| id.into_inner())),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| map_db_err(e, || LedgerError::ConcurrentAppend(user_id)))?;

    LedgerEntry::try_from(model)
}
