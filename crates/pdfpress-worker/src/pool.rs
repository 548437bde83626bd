//! Worker pool — polls the queue and dispatches jobs to the runner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing;

use pdfpress_broker::JobQueue;
use pdfpress_core::config::worker::WorkerConfig;

use crate::runner::JobRunner;

/// Worker pool that polls the job queue and executes jobs concurrently.
#[derive(Debug)]
pub struct WorkerPool {
    /// Job queue to poll.
    queue: Arc<dyn JobQueue>,
    /// Runner executing each dequeued job.
    runner: Arc<JobRunner>,
    /// Worker configuration.
    config: WorkerConfig,
}

impl WorkerPool {
    /// Create a new worker pool.
    pub fn new(queue: Arc<dyn JobQueue>, runner: Arc<JobRunner>, config: WorkerConfig) -> Self {
        Self {
            queue,
            runner,
            config,
        }
    }

    /// Start the pool — runs until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Worker pool started with concurrency={}, poll_interval={}ms",
            self.config.concurrency,
            self.config.poll_interval_ms
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Worker pool received shutdown signal");
                        break;
                    }
                }
                dispatched = self.poll_and_dispatch(&semaphore) => {
                    // Only sleep when the queue was empty or saturated,
                    // so a backlog drains at full speed.
                    if !dispatched {
                        tokio::select! {
                            _ = cancel.changed() => {
                                if *cancel.borrow() {
                                    tracing::info!("Worker pool shutting down");
                                    break;
                                }
                            }
                            _ = time::sleep(poll_interval) => {}
                        }
                    }
                }
            }
        }

        tracing::info!("Worker pool waiting for in-flight jobs to complete...");
        let max_permits = self.config.concurrency as u32;
        let _ =
            time::timeout(Duration::from_secs(30), semaphore.acquire_many(max_permits)).await;
        tracing::info!("Worker pool shut down complete");
    }

    /// Poll once and dispatch the job if one is available.
    ///
    /// Returns whether a job was dispatched.
    async fn poll_and_dispatch(&self, semaphore: &Arc<Semaphore>) -> bool {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::trace!("All worker slots occupied, waiting...");
                return false;
            }
        };

        match self.queue.dequeue().await {
            Ok(Some(id)) => {
                let runner = Arc::clone(&self.runner);
                tokio::spawn(async move {
                    let _permit = permit;
                    runner.process(id).await;
                });
                true
            }
            Ok(None) => {
                drop(permit);
                false
            }
            Err(e) => {
                drop(permit);
                tracing::error!("Failed to dequeue job: {}", e);
                false
            }
        }
    }
}
