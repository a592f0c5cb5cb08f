//! Per-user run history endpoint
//!
//! `GET /projects/latest` requires a verified bearer token and returns the
//! most recent persisted run per description for that user only. The query
//! is scoped by the verified user id and executed with the user's own
//! token, so the storage backend's row policies see the same identity.

use crate::middleware::auth::RequireUser;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use metis_core::SupabaseStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

/// Fetch the caller's latest run per description
async fn latest_projects(
    Extension(store): Extension<Option<Arc<SupabaseStore>>>,
    RequireUser(user): RequireUser,
) -> Response {
    let Some(store) = store else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                success: false,
                error: "Run persistence is not configured on this server".to_string(),
                code: "PERSISTENCE_NOT_CONFIGURED".to_string(),
            }),
        )
            .into_response();
    };

    match store.latest_runs(&user).await {
        Ok(runs) => Json(runs).into_response(),
        Err(e) => {
            error!(user_id = %user.user_id, error = %e, "history query failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    success: false,
                    error: "History backend unavailable".to_string(),
                    code: "STORE_ERROR".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Create project history routes
pub fn projects_routes() -> Router {
    Router::new().route("/projects/latest", get(latest_projects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::AuthState;
    use axum::body::Body;
    use axum::http::Request;
    use metis_core::TokenVerifier;
    use tower::ServiceExt;

    fn app(verifier: Option<Arc<TokenVerifier>>) -> Router {
        let store: Option<Arc<SupabaseStore>> = None;
        projects_routes()
            .layer(Extension(store))
            .layer(Extension(AuthState::new(verifier)))
    }

    #[tokio::test]
    async fn test_latest_without_token_is_unauthorized() {
        let app = app(Some(Arc::new(TokenVerifier::new("secret"))));
        let response = app
            .oneshot(Request::get("/projects/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_latest_with_garbage_token_is_unauthorized() {
        let app = app(Some(Arc::new(TokenVerifier::new("secret"))));
        let response = app
            .oneshot(
                Request::get("/projects/latest")
                    .header("authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_latest_without_verifier_is_unavailable() {
        let app = app(None);
        let response = app
            .oneshot(Request::get("/projects/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
