//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use pdfpress_broker::{JobQueue, JobStore};
use pdfpress_core::config::AppConfig;
use pdfpress_storage::ArtifactStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Job record store (Redis or in-memory)
    pub store: Arc<dyn JobStore>,
    /// Job queue (Redis or in-memory)
    pub queue: Arc<dyn JobQueue>,
    /// Artifact store for uploads and outputs
    pub artifacts: Arc<ArtifactStore>,
}
