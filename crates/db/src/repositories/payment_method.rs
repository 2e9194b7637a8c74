//! Payment method repository: issues virtual accounts for top-up requests.
//!
//! Lookups live in [`crate::BalanceQuery`]; the status transition lives in
//! [`crate::ReconciliationRepository`].

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use topup_core::ledger::{HISTORY_LIMIT, LedgerError};
use topup_core::topup::{IssueVaInput, PaymentMethod, TopUpService, VaGenerator};
use topup_shared::types::UserId;
use tracing::info;

use super::{convert_all, db_err, map_db_err};
use crate::entities::payment_methods;

/// Payment method repository.
#[derive(Clone)]
pub struct PaymentMethodRepository {
    db: DatabaseConnection,
    generator: Arc<dyn VaGenerator>,
}

impl std::fmt::Debug for PaymentMethodRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentMethodRepository").finish_non_exhaustive()
    }
}

impl PaymentMethodRepository {
    /// Creates a repository that assigns VAs with `generator`.
    #[must_use]
    pub fn new(db: DatabaseConnection, generator: Arc<dyn VaGenerator>) -> Self {
        Self { db, generator }
    }

    /// Issues a virtual account for a top-up request.
    ///
    /// The new payment method is `pending`. The user's ledger does not need to
    /// be open yet.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive nominal or bad holder
    /// name, and `DuplicateVirtualAccount` if the generated VA already exists.
    pub async fn issue_va(&self, input: IssueVaInput) -> Result<PaymentMethod, LedgerError> {
        let now = Utc::now();
        let new = TopUpService::prepare_issue(input, self.generator.as_ref(), now)?;
        let va = new.va.clone();

        let model = payment_methods::ActiveModel {
            user_id: Set(i64::from(new.user_id)),
            holder_name: Set(new.holder_name),
            va: Set(new.va),
            nominal: Set(new.nominal.value()),
            status: Set(new.status.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_db_err(e, || LedgerError::DuplicateVirtualAccount(va.clone())))?;

        let payment = PaymentMethod::try_from(model)?;
        info!(
            user_id = %payment.user_id,
            payment_method_id = %payment.id,
            nominal = %payment.nominal,
            "Issued virtual account"
        );
        Ok(payment)
    }
}

/// Looks up a VA owned by `user_id`.
pub(crate) async fn find_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    va: &str,
) -> Result<Option<PaymentMethod>, LedgerError> {
    payment_methods::Entity::find()
        .filter(payment_methods::Column::UserId.eq(i64::from(user_id)))
        .filter(payment_methods::Column::Va.eq(va))
        .one(conn)
        .await
        .map_err(db_err)?
        .map(PaymentMethod::try_from)
        .transpose()
}

/// Lists the newest payment methods for a user.
pub(crate) async fn list_recent<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<Vec<PaymentMethod>, LedgerError> {
    let models = payment_methods::Entity::find()
        .filter(payment_methods::Column::UserId.eq(i64::from(user_id)))
        .order_by_desc(payment_methods::Column::Id)
        .limit(HISTORY_LIMIT)
        .all(conn)
        .await
        .map_err(db_err)?;

    convert_all(models)
}
