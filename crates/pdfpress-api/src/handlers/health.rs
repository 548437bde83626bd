//! Health check handler.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use pdfpress_core::result::AppResult;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Reports reachability of the job store, the queue, and the artifact
/// storage independently. Any failing component makes the probe return
/// 503 with the per-component breakdown intact.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = check("store", state.store.health_check().await);
    let queue_ok = check("queue", state.queue.health_check().await);
    let storage_ok = check("storage", state.artifacts.health_check().await);

    let mut components = BTreeMap::new();
    components.insert("store".to_string(), component_status(store_ok));
    components.insert("queue".to_string(), component_status(queue_ok));
    components.insert("storage".to_string(), component_status(storage_ok));

    let all_ok = store_ok && queue_ok && storage_ok;
    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: component_status(all_ok),
            components,
        }),
    )
}

fn check(name: &str, result: AppResult<bool>) -> bool {
    match result {
        Ok(ok) => ok,
        Err(e) => {
            tracing::error!("Health check failed - {}: {}", name, e);
            false
        }
    }
}

fn component_status(ok: bool) -> String {
    if ok { "healthy" } else { "unhealthy" }.to_string()
}
