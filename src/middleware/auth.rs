//! Authentication middleware for Axum
//!
//! Extracts the bearer token from requests and verifies it against the
//! configured `TokenVerifier`. Two extractors with different contracts:
//! `RequireUser` rejects requests without a valid token (history reads);
//! `OptionalUser` degrades to an anonymous, non-persistent run on a
//! missing or invalid token (planning runs).

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metis_core::{AuthError, TokenVerifier, UserIdentity};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Shared verifier state injected as an Extension
#[derive(Clone, Default)]
pub struct AuthState {
    verifier: Option<Arc<TokenVerifier>>,
}

impl AuthState {
    /// Create the state from an optional verifier
    pub fn new(verifier: Option<Arc<TokenVerifier>>) -> Self {
        Self { verifier }
    }
}

/// JSON error response for auth failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl AuthErrorResponse {
    fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Auth rejection type
pub struct AuthRejection {
    status: StatusCode,
    body: AuthErrorResponse,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AuthRejection {
                status: StatusCode::UNAUTHORIZED,
                body: AuthErrorResponse::new(
                    "Authentication required. Provide Authorization: Bearer <token>.",
                    "UNAUTHORIZED",
                ),
            },
            AuthError::NotConfigured => AuthRejection {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: AuthErrorResponse::new(
                    "Token verification is not configured on this server",
                    "AUTH_NOT_CONFIGURED",
                ),
            },
            other => AuthRejection {
                status: StatusCode::UNAUTHORIZED,
                body: AuthErrorResponse::new(other.to_string(), "INVALID_TOKEN"),
            },
        }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    if let Some(auth_header) = parts.headers.get("authorization") {
        if let Ok(value) = auth_header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Ok(token.trim().to_string());
            }
        }
    }
    Err(AuthError::MissingToken)
}

fn verify(parts: &Parts) -> Result<UserIdentity, AuthError> {
    let state = parts
        .extensions
        .get::<AuthState>()
        .ok_or(AuthError::NotConfigured)?;
    let verifier = state.verifier.as_ref().ok_or(AuthError::NotConfigured)?;
    let token = extract_token(parts)?;
    verifier.verify(&token)
}

/// Axum extractor that requires a verified user.
pub struct RequireUser(pub UserIdentity);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        verify(parts).map(RequireUser).map_err(AuthRejection::from)
    }
}

/// Axum extractor that attaches a user when a valid token is present.
///
/// A missing or invalid token is not a rejection: the run proceeds
/// anonymously and is simply not persisted.
pub struct OptionalUser(pub Option<UserIdentity>);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match verify(parts) {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(AuthError::MissingToken | AuthError::NotConfigured) => Ok(OptionalUser(None)),
            Err(e) => {
                warn!(error = %e, "invalid bearer token; continuing as anonymous run");
                Ok(OptionalUser(None))
            }
        }
    }
}
