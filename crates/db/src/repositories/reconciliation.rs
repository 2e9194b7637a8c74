//! Reconciliation: settles a pending top-up into the ledger.
//!
//! Every read and write of one reconciliation runs on the same database
//! transaction, and its first statement is the conditional claim of the
//! payment method. On Postgres the claim row-locks the VA, so a racing claim
//! waits and then matches nothing. On SQLite a write as the first statement
//! takes the database write lock before any snapshot is read, so racing
//! reconciliations queue on the busy timeout instead of failing. Either way
//! only one caller can credit a VA.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use topup_core::ledger::{LedgerEntry, LedgerError};
use topup_core::topup::{PaymentMethod, PaymentStatus, ReconciliationPlan, TopUpService};
use topup_shared::types::{PaymentMethodId, UserId};
use tracing::{debug, info, warn};

use super::ledger::{insert_entry, latest_entry};
use super::payment_method::find_for_user;
use super::{db_err, finish, map_db_err};
use crate::entities::{ledger_entries, payment_methods, sea_orm_active_enums};

/// Result of a reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationOutcome {
    /// The entry that reflects the credit.
    pub entry: LedgerEntry,
    /// The payment method, now `success`.
    pub payment_method: PaymentMethod,
    /// False if the VA had already been settled and nothing was written.
    pub applied: bool,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Credits the nominal of `va` to the user's balance.
    ///
    /// Reconciling an already settled VA is a successful no-op that returns
    /// the entry it produced the first time.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `VirtualAccountNotFound` if the VA does not exist for this user
    /// - `BalanceNotFound` if the user's ledger is not open
    /// - a validation error if the credit overflows
    /// - `ConcurrentReconciliation` or `ConcurrentAppend` if a concurrent
    ///   writer won; nothing is written in that case
    pub async fn reconcile(
        &self,
        user_id: UserId,
        va: &str,
    ) -> Result<ReconciliationOutcome, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let result = reconcile_in(&txn, user_id, va).await;
        let outcome = finish(txn, result, || {
            LedgerError::ConcurrentReconciliation(va.to_string())
        })
        .await?;

        if outcome.applied {
            info!(
                user_id = %user_id,
                va = %va,
                nominal = %outcome.payment_method.nominal,
                balance = %outcome.entry.amount,
                "Reconciled top-up"
            );
        } else {
            debug!(user_id = %user_id, va = %va, "Virtual account already reconciled");
        }
        Ok(outcome)
    }
}

async fn reconcile_in(
    txn: &DatabaseTransaction,
    user_id: UserId,
    va: &str,
) -> Result<ReconciliationOutcome, LedgerError> {
    let now = Utc::now();
    let claimed = claim(txn, user_id, va, now).await?;

    let stored = find_for_user(txn, user_id, va)
        .await?
        .ok_or_else(|| LedgerError::VirtualAccountNotFound(va.to_string()))?;

    let current = latest_entry(txn, user_id)
        .await?
        .ok_or(LedgerError::BalanceNotFound(user_id))?;

    // The claim only matches a pending row, so a claimed VA was pending
    // before this transaction.
    let before = PaymentMethod {
        status: if claimed { PaymentStatus::Pending } else { stored.status },
        ..stored.clone()
    };

    match TopUpService::plan(&current, &before)? {
        ReconciliationPlan::AlreadySettled(payment_method_id) => Ok(ReconciliationOutcome {
            entry: settlement_entry(txn, payment_method_id).await?,
            payment_method: stored,
            applied: false,
        }),
        ReconciliationPlan::Credit(new_entry) if claimed => Ok(ReconciliationOutcome {
            entry: insert_entry(txn, new_entry).await?,
            payment_method: stored,
            applied: true,
        }),
        ReconciliationPlan::Credit(_) => {
            warn!(user_id = %user_id, va = %va, "Lost reconciliation race");
            Err(LedgerError::ConcurrentReconciliation(va.to_string()))
        }
    }
}

/// Flips the user's VA from `pending` to `success`.
///
/// Returns false if no pending row matched: the VA is unknown, owned by
/// someone else, or already settled.
async fn claim(
    txn: &DatabaseTransaction,
    user_id: UserId,
    va: &str,
    now: DateTime<Utc>,
) -> Result<bool, LedgerError> {
    let now_tz: DateTime<FixedOffset> = now.into();
    let claimed = payment_methods::Entity::update_many()
        .col_expr(
            payment_methods::Column::Status,
            Expr::value(sea_orm_active_enums::PaymentStatus::Success),
        )
        .col_expr(payment_methods::Column::UpdatedAt, Expr::value(now_tz))
        .filter(payment_methods::Column::UserId.eq(i64::from(user_id)))
        .filter(payment_methods::Column::Va.eq(va))
        .filter(payment_methods::Column::Status.eq(sea_orm_active_enums::PaymentStatus::Pending))
        .exec(txn)
        .await
        .map_err(|e| map_db_err(e, || LedgerError::ConcurrentReconciliation(va.to_string())))?;

    Ok(claimed.rows_affected == 1)
}

/// Reads the entry that settled a payment method.
async fn settlement_entry(
    txn: &DatabaseTransaction,
    payment_method_id: PaymentMethodId,
) -> Result<LedgerEntry, LedgerError> {
    ledger_entries::Entity::find()
        .filter(ledger_entries::Column::PaymentMethodId.eq(payment_method_id.into_inner()))
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::SettlementEntryNotFound(payment_method_id))
        .and_then(LedgerEntry::try_from)
}
