//! Top-up routes: issue virtual accounts, look them up, and reconcile them.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser,
    routes::balance::LedgerEntryResponse,
};
use topup_core::ledger::LedgerError;
use topup_core::topup::{IssueVaInput, PaymentMethod, TopUpService};
use topup_db::{
    BalanceQuery, PaymentMethodRepository, ReconciliationOutcome, ReconciliationRepository,
};
use topup_shared::types::MinorUnits;

/// Creates the top-up routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/topups", post(issue_topup).get(list_topups))
        .route("/topups/{va}", get(get_topup))
        .route("/topups/{va}/reconcile", post(reconcile_topup))
}

/// Nominal as sent by clients: a JSON integer or an integer string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NominalInput {
    /// `50000`
    Int(i64),
    /// `"50000"`
    Text(String),
}

impl NominalInput {
    /// Parses and range-checks the nominal.
    pub fn parse(&self) -> Result<MinorUnits, LedgerError> {
        match self {
            Self::Int(value) => TopUpService::validate_nominal(MinorUnits::new(*value)),
            Self::Text(raw) => TopUpService::parse_nominal(raw),
        }
    }
}

/// Request body for issuing a virtual account.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IssueTopUpRequest {
    /// Requested amount in minor units.
    pub nominal: NominalInput,
    /// Name shown on the virtual account.
    #[validate(length(min = 1, max = 255))]
    pub holder_name: String,
}

/// A payment method as returned to clients.
#[derive(Debug, Serialize)]
pub struct PaymentMethodResponse {
    /// Payment method ID.
    pub id: i64,
    /// Virtual-account reference.
    pub va: String,
    /// Holder name.
    pub holder_name: String,
    /// Requested amount in minor units.
    pub nominal: i64,
    /// `pending` or `success`.
    pub status: &'static str,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentMethod> for PaymentMethodResponse {
    fn from(payment: PaymentMethod) -> Self {
        Self {
            id: payment.id.into_inner(),
            va: payment.va,
            holder_name: payment.holder_name,
            nominal: payment.nominal.value(),
            status: payment.status.as_str(),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

/// Response for the list endpoint.
#[derive(Debug, Serialize)]
pub struct TopUpListResponse {
    /// Payment methods, newest first.
    pub topups: Vec<PaymentMethodResponse>,
}

/// Response for a reconciliation.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// False if the VA had already been reconciled.
    pub applied: bool,
    /// The entry holding the credited balance.
    pub balance: LedgerEntryResponse,
    /// The settled payment method.
    pub payment_method: PaymentMethodResponse,
}

impl From<ReconciliationOutcome> for ReconcileResponse {
    fn from(outcome: ReconciliationOutcome) -> Self {
        Self {
            applied: outcome.applied,
            balance: outcome.entry.into(),
            payment_method: outcome.payment_method.into(),
        }
    }
}

/// POST `/topups` - Issue a virtual account for a top-up.
async fn issue_topup(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<IssueTopUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nominal = payload.nominal.parse()?;

    let repo = PaymentMethodRepository::new((*state.db).clone(), state.va_generator.clone());
    let payment = repo
        .issue_va(IssueVaInput {
            user_id: auth.user_id(),
            nominal,
            holder_name: payload.holder_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentMethodResponse::from(payment))))
}

/// GET `/topups` - The caller's most recent top-up requests.
async fn list_topups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TopUpListResponse>, ApiError> {
    let query = BalanceQuery::new((*state.db).clone());
    let topups = query.list_payment_methods(auth.user_id()).await?;
    Ok(Json(TopUpListResponse {
        topups: topups.into_iter().map(Into::into).collect(),
    }))
}

/// GET `/topups/{va}` - One of the caller's top-up requests.
async fn get_topup(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(va): Path<String>,
) -> Result<Json<PaymentMethodResponse>, ApiError> {
    let query = BalanceQuery::new((*state.db).clone());
    let payment = query.find_payment_method(auth.user_id(), &va).await?;
    Ok(Json(payment.into()))
}

/// POST `/topups/{va}/reconcile` - Credit a confirmed top-up to the balance.
async fn reconcile_topup(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(va): Path<String>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let repo = ReconciliationRepository::new((*state.db).clone());
    let outcome = repo.reconcile(auth.user_id(), &va).await?;

    info!(
        user_id = %auth.user_id(),
        va = %va,
        applied = outcome.applied,
        "Top-up reconciled"
    );
    Ok(Json(outcome.into()))
}
