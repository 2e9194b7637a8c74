//! Read-only views over the ledger and payment methods.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use topup_core::ledger::{BalanceStatement, LedgerEntry, LedgerError};
use topup_core::topup::PaymentMethod;
use topup_shared::types::UserId;

use super::ledger::{history_entries, latest_entry};
use super::payment_method::{find_for_user, list_recent};
use super::{convert_all, db_err};
use crate::entities::ledger_entries;

/// Balance and top-up queries.
#[derive(Debug, Clone)]
pub struct BalanceQuery {
    db: DatabaseConnection,
}

impl BalanceQuery {
    /// Creates a new query handle.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the user's latest entry.
    ///
    /// # Errors
    ///
    /// Returns `BalanceNotFound` if the user has no entries.
    pub async fn current_balance(&self, user_id: UserId) -> Result<LedgerEntry, LedgerError> {
        latest_entry(&self.db, user_id)
            .await?
            .ok_or(LedgerError::BalanceNotFound(user_id))
    }

    /// Returns up to 100 top-up entries, newest first.
    ///
    /// Empty for a user with no ledger.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<LedgerEntry>, LedgerError> {
        history_entries(&self.db, user_id).await
    }

    /// Rebuilds the user's full statement with per-entry deltas.
    ///
    /// # Errors
    ///
    /// Returns `BalanceNotFound` if the user has no entries and
    /// `CorruptRecord` if stored rows cannot be turned into a statement.
    pub async fn statement(&self, user_id: UserId) -> Result<BalanceStatement, LedgerError> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::UserId.eq(i64::from(user_id)))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if models.is_empty() {
            return Err(LedgerError::BalanceNotFound(user_id));
        }

        BalanceStatement::from_entries(user_id, convert_all(models)?)
    }

    /// Finds a payment method owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `VirtualAccountNotFound` if the user has no such VA.
    pub async fn find_payment_method(
        &self,
        user_id: UserId,
        va: &str,
    ) -> Result<PaymentMethod, LedgerError> {
        find_for_user(&self.db, user_id, va)
            .await?
            .ok_or_else(|| LedgerError::VirtualAccountNotFound(va.to_string()))
    }

    /// Lists the user's payment methods, newest first.
    pub async fn list_payment_methods(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PaymentMethod>, LedgerError> {
        list_recent(&self.db, user_id).await
    }
}
