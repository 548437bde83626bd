//! In-memory job store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use pdfpress_core::error::AppError;
use pdfpress_core::result::AppResult;
use pdfpress_core::types::JobId;
use pdfpress_entity::job::{Job, JobState, JobStatus};

use crate::traits::JobStore;

/// In-memory [`JobStore`] backed by a concurrent map.
///
/// The guarded transition holds the entry lock across the compare and
/// the write, which gives the same exactly-once claim semantics as the
/// Redis provider's Lua script.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl MemoryJobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: &Job) -> AppResult<()> {
        match self.jobs.entry(job.id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "job {} already exists",
                job.id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(job.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: JobId) -> AppResult<Option<Job>> {
        Ok(self.jobs.get(&id).map(|entry| entry.value().clone()))
    }

    async fn transition(&self, id: JobId, from: JobStatus, to: JobState) -> AppResult<Job> {
        let mut entry = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("job {id} not found")))?;

        let current = entry.status();
        if current != from {
            return Err(AppError::conflict(format!(
                "job {id} is {current}, expected {from}"
            )));
        }
        entry.state = to;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
