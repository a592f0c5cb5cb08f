//! Planning run endpoints
//!
//! `POST /run` (and its `/projects/run` alias) executes one orchestrated
//! run. A valid bearer token attaches a user for persistence; without one
//! the run is anonymous. Validation failures are the caller's fault (400);
//! per-agent failures are not HTTP errors at all, they are entries in the
//! result mapping.

use crate::middleware::auth::OptionalUser;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use metis_core::{Error, Orchestrator, RunRequest};
use serde::Serialize;
use std::sync::Arc;

/// JSON error body for failed requests
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

/// Map a core error to an HTTP response
fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::UnknownAgent(_)
        | Error::EmptyDescription
        | Error::EmptyAgentSet
        | Error::UnknownDataset(_)
        | Error::Dataset(_) => StatusCode::BAD_REQUEST,
        Error::Auth(_) => StatusCode::UNAUTHORIZED,
        Error::Llm(metis_llm::Error::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Store(_) | Error::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Execute one planning run
///
/// The run itself executes on a detached task: a client disconnect drops
/// this handler future but must not cancel in-flight agent calls, and a
/// finished run still exports/persists.
async fn run_project(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    OptionalUser(user): OptionalUser,
    Json(request): Json<RunRequest>,
) -> Response {
    let run = tokio::spawn(async move { orchestrator.run(&request, user).await });

    match run.await {
        Ok(Ok(result)) => Json(result).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                error: format!("run task failed: {e}"),
            }),
        )
            .into_response(),
    }
}

/// Create run routes
pub fn runs_routes() -> Router {
    Router::new()
        .route("/run", post(run_project))
        .route("/projects/run", post(run_project))
}
