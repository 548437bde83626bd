//! Route definitions for the PdfPress HTTP API.
//!
//! Job routes are mounted under `/api`; the health probe stays at the
//! root so load balancers can reach it without the API prefix. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Slack on top of the configured upload cap so the streaming guard,
/// not the framework's body limit, rejects oversized files with the
/// JSON error envelope. Covers multipart framing overhead.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Build the Axum router with all routes.
///
/// Cross-cutting layers (CORS, tracing, request logging) are applied in
/// [`crate::app::build_app`] on top of this router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes() as usize + BODY_LIMIT_SLACK;

    Router::new()
        .nest("/api", job_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Job lifecycle endpoints: create, status, download.
fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(handlers::jobs::create_job))
        .route("/jobs/{id}", get(handlers::jobs::get_job))
        .route("/jobs/{id}/download", get(handlers::jobs::download_job))
}

/// Health check endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
