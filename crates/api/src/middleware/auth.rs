//! Bearer-token authentication for the balance and top-up routes.
//!
//! Tokens are issued by the identity provider; this service only verifies
//! them and reads the user id they carry.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::AppState;
use topup_shared::types::UserId;
use topup_shared::{Claims, JwtError};

/// Why a request was refused before reaching a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// The token's `exp` has passed.
    TokenExpired,
    /// Bad signature, malformed token, or unusable subject.
    InvalidToken,
    /// A protected handler ran without the middleware.
    Unauthenticated,
}

impl AuthRejection {
    const fn error_code(self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Unauthenticated => "UNAUTHORIZED",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "Authorization header with Bearer token is required",
            Self::TokenExpired => "Token has expired",
            Self::InvalidToken => "Invalid or malformed token",
            Self::Unauthenticated => "Authentication required",
        }
    }
}

impl From<JwtError> for AuthRejection {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.error_code(), "message": self.message() })),
        )
            .into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(AuthRejection::MissingToken)
}

/// Verifies the bearer token and attaches the caller as an [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let token = bearer_token(request.headers())?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        AuthRejection::from(e)
    })?;

    request.extensions_mut().insert(AuthUser(claims));
    Ok(next.run(request).await)
}

/// The verified caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthUser(Claims);

impl AuthUser {
    /// Returns the caller's user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthRejection::Unauthenticated)
    }
}
