//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use topup_core::ledger::LedgerError;
use topup_shared::AppError;
use tracing::error;

/// A request failure rendered as `{"error": <code>, "message": <text>}`.
///
/// Ledger failures keep their own code, so clients can tell a lost race
/// (`CONCURRENT_RECONCILIATION`) from a VA collision
/// (`DUPLICATE_VIRTUAL_ACCOUNT`).
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure such as a rejected body.
    App(AppError),
    /// Failure reported by the ledger or top-up operations.
    Ledger(LedgerError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let code = match self {
            Self::App(err) => err.status_code(),
            Self::Ledger(err) => err.http_status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    const fn error_code(&self) -> &'static str {
        match self {
            Self::App(err) => err.error_code(),
            Self::Ledger(err) => err.error_code(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::App(err) => std::fmt::Display::fmt(err, f),
            Self::Ledger(err) => std::fmt::Display::fmt(err, f),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side details stay in the logs.
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use topup_shared::types::UserId;

    #[rstest]
    #[case(LedgerError::MalformedNominal("abc".into()), StatusCode::BAD_REQUEST, "MALFORMED_NOMINAL")]
    #[case(LedgerError::VirtualAccountNotFound("1".into()), StatusCode::NOT_FOUND, "VIRTUAL_ACCOUNT_NOT_FOUND")]
    #[case(LedgerError::BalanceNotFound(UserId::new(1)), StatusCode::NOT_FOUND, "BALANCE_NOT_FOUND")]
    #[case(LedgerError::ConcurrentAppend(UserId::new(1)), StatusCode::CONFLICT, "CONCURRENT_APPEND")]
    #[case(LedgerError::ConcurrentReconciliation("1".into()), StatusCode::CONFLICT, "CONCURRENT_RECONCILIATION")]
    #[case(LedgerError::DuplicateVirtualAccount("1".into()), StatusCode::CONFLICT, "DUPLICATE_VIRTUAL_ACCOUNT")]
    #[case(LedgerError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")]
    #[tokio::test]
    async fn test_ledger_error_response(
        #[case] err: LedgerError,
        #[case] expected_status: StatusCode,
        #[case] expected_code: &str,
    ) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), expected_status);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], expected_code);
    }

    #[tokio::test]
    async fn test_server_error_message_is_hidden() {
        let response = ApiError::from(LedgerError::Database("password=hunter2".into())).into_response();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[test]
    fn test_app_error_keeps_generic_code() {
        let err = ApiError::from(AppError::Validation("bad body".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
