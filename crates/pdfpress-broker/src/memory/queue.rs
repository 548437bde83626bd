//! In-memory FIFO job queue.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pdfpress_core::result::AppResult;
use pdfpress_core::types::JobId;

use crate::traits::JobQueue;

/// In-memory [`JobQueue`] backed by a mutex-guarded deque.
#[derive(Debug, Default)]
pub struct MemoryJobQueue {
    entries: Mutex<VecDeque<JobId>>,
}

impl MemoryJobQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, id: JobId) -> AppResult<()> {
        self.entries.lock().await.push_back(id);
        Ok(())
    }

    async fn dequeue(&self) -> AppResult<Option<JobId>> {
        Ok(self.entries.lock().await.pop_front())
    }

    async fn len(&self) -> AppResult<u64> {
        Ok(self.entries.lock().await.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
