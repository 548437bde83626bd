//! Application builder — wires router + middleware + state into an Axum app.

use std::sync::Arc;

use axum::{Router, middleware as axum_middleware};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use pdfpress_broker::provider::BrokerManager;
use pdfpress_core::config::AppConfig;
use pdfpress_core::error::AppError;
use pdfpress_optimizer::GhostscriptOptimizer;
use pdfpress_storage::ArtifactStore;
use pdfpress_worker::{JobRunner, WorkerPool};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the PdfPress server with the given configuration.
///
/// Owns the full wiring sequence: artifact directories, broker, the
/// in-process worker pool, and finally the HTTP listener with graceful
/// shutdown.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PdfPress server...");

    // ── Step 1: Initialize artifact storage ──────────────────────
    let artifacts = Arc::new(ArtifactStore::new(&config.storage.root).await?);
    tracing::info!("Artifact store ready at {}", config.storage.root);

    // ── Step 2: Initialize broker ────────────────────────────────
    tracing::info!(
        "Initializing broker (provider: {})...",
        config.broker.provider
    );
    let broker = BrokerManager::new(&config.broker).await?;

    // ── Step 3: Shutdown channel & worker pool ───────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let optimizer = Arc::new(GhostscriptOptimizer::new(&config.optimizer));
        let runner = Arc::new(JobRunner::new(
            broker.store(),
            Arc::clone(&artifacts),
            optimizer,
        ));
        let pool = WorkerPool::new(broker.queue(), runner, config.worker.clone());

        let worker_cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            pool.run(worker_cancel).await;
        }))
    } else {
        tracing::info!("Worker pool disabled");
        None
    };

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app_state = AppState {
        config: Arc::new(config.clone()),
        store: broker.store(),
        queue: broker.queue(),
        artifacts,
    };

    let app = build_app(app_state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("PdfPress server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 5: Wait for the worker pool to drain ────────────────
    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("PdfPress server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
