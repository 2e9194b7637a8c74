//! Balance routes: open a ledger, read the current balance, history, and
//! statement.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use topup_core::ledger::{BalanceStatement, LedgerEntry, StatementLine};
use topup_db::{BalanceQuery, LedgerRepository};

/// Creates the balance routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balance", get(current_balance))
        .route("/balance/open", post(open_balance))
        .route("/balance/history", get(history))
        .route("/balance/statement", get(statement))
}

/// A ledger entry as returned to clients.
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    /// Entry ID.
    pub id: i64,
    /// Per-user sequence number.
    pub version: i64,
    /// Running balance after this entry, in minor units.
    pub amount: i64,
    /// `active` or `topup`.
    pub status: &'static str,
    /// Payment method that produced the entry.
    pub payment_method_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id.into_inner(),
            version: entry.version,
            amount: entry.amount.value(),
            status: entry.status.as_str(),
            payment_method_id: entry.payment_method_id.map(|id| id.into_inner()),
            created_at: entry.created_at,
        }
    }
}

/// Response for the history endpoint.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Top-up entries, newest first.
    pub entries: Vec<LedgerEntryResponse>,
}

/// One statement line.
#[derive(Debug, Serialize)]
pub struct StatementLineResponse {
    /// The entry.
    #[serde(flatten)]
    pub entry: LedgerEntryResponse,
    /// Change from the previous entry.
    pub delta: i64,
}

impl From<StatementLine> for StatementLineResponse {
    fn from(line: StatementLine) -> Self {
        Self {
            entry: line.entry.into(),
            delta: line.delta.value(),
        }
    }
}

/// Response for the statement endpoint.
#[derive(Debug, Serialize)]
pub struct StatementResponse {
    /// Opening balance.
    pub opening_balance: i64,
    /// Sum of top-up credits.
    pub total_credited: i64,
    /// Current balance.
    pub closing_balance: i64,
    /// Entries oldest first.
    pub lines: Vec<StatementLineResponse>,
}

impl From<BalanceStatement> for StatementResponse {
    fn from(statement: BalanceStatement) -> Self {
        Self {
            opening_balance: statement.opening_balance.value(),
            total_credited: statement.total_credited.value(),
            closing_balance: statement.closing_balance.value(),
            lines: statement.lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// POST `/balance/open` - Open the caller's ledger (idempotent).
async fn open_balance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());
    let entry = repo.open_account(auth.user_id()).await?;

    info!(user_id = %auth.user_id(), entry_id = %entry.id, "Balance opened");
    Ok((StatusCode::OK, Json(LedgerEntryResponse::from(entry))))
}

/// GET `/balance` - Current balance.
async fn current_balance(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<LedgerEntryResponse>, ApiError> {
    let query = BalanceQuery::new((*state.db).clone());
    let entry = query.current_balance(auth.user_id()).await?;
    Ok(Json(entry.into()))
}

/// GET `/balance/history` - Up to 100 top-up entries, newest first.
async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<HistoryResponse>, ApiError> {
    let query = BalanceQuery::new((*state.db).clone());
    let entries = query.history(auth.user_id()).await?;
    Ok(Json(HistoryResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    }))
}

/// GET `/balance/statement` - Every entry with its delta.
async fn statement(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<StatementResponse>, ApiError> {
    let query = BalanceQuery::new((*state.db).clone());
    let statement = query.statement(auth.user_id()).await?;
    Ok(Json(statement.into()))
}
