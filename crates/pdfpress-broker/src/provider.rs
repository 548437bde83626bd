//! Broker manager that dispatches to the configured provider.

use std::sync::Arc;

use tracing::info;

use pdfpress_core::config::broker::BrokerConfig;
use pdfpress_core::error::AppError;
use pdfpress_core::result::AppResult;

use crate::traits::{JobQueue, JobStore};

/// Broker manager that wraps the configured store and queue providers.
///
/// Both halves are selected together at construction time so that a
/// Redis deployment shares one connection manager between them.
#[derive(Debug, Clone)]
pub struct BrokerManager {
    /// The inner job store.
    store: Arc<dyn JobStore>,
    /// The inner job queue.
    queue: Arc<dyn JobQueue>,
}

impl BrokerManager {
    /// Create a new broker manager from configuration.
    pub async fn new(config: &BrokerConfig) -> AppResult<Self> {
        let (store, queue): (Arc<dyn JobStore>, Arc<dyn JobQueue>) =
            match config.provider.as_str() {
                #[cfg(feature = "redis-backend")]
                "redis" => {
                    info!("Initializing Redis broker provider");
                    let client = crate::redis::RedisClient::connect(&config.redis).await?;
                    (
                        Arc::new(crate::redis::RedisJobStore::new(client.clone())),
                        Arc::new(crate::redis::RedisJobQueue::new(client)),
                    )
                }
                #[cfg(feature = "memory")]
                "memory" => {
                    info!("Initializing in-memory broker provider");
                    (
                        Arc::new(crate::memory::MemoryJobStore::new()),
                        Arc::new(crate::memory::MemoryJobQueue::new()),
                    )
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown broker provider: '{other}'. Supported: memory, redis"
                    )));
                }
            };

        Ok(Self { store, queue })
    }

    /// Create a broker manager from existing providers (for testing).
    pub fn from_providers(store: Arc<dyn JobStore>, queue: Arc<dyn JobQueue>) -> Self {
        Self { store, queue }
    }

    /// Get a shared handle to the job store.
    pub fn store(&self) -> Arc<dyn JobStore> {
        Arc::clone(&self.store)
    }

    /// Get a shared handle to the job queue.
    pub fn queue(&self) -> Arc<dyn JobQueue> {
        Arc::clone(&self.queue)
    }
}
