//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pdfpress_core::types::JobId;

use super::params::OptimizeParams;
use super::state::{JobState, JobStatus};

/// An optimization job.
///
/// The record everything else in the system reads and mutates. Identity,
/// parameters, and the input location are fixed at creation; only `state`
/// and `updated_at` change afterwards, and only through the store's
/// guarded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Optimization parameters.
    pub params: OptimizeParams,
    /// Sanitized client-supplied filename, for display only.
    pub original_filename: String,
    /// Storage-relative path of the uploaded input.
    pub input_path: String,
    /// Current state, including status-dependent payloads.
    #[serde(flatten)]
    pub state: JobState,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a fresh job in the `queued` state.
    pub fn new(
        id: JobId,
        params: OptimizeParams,
        original_filename: impl Into<String>,
        input_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            params,
            original_filename: original_filename.into(),
            input_path: input_path.into(),
            state: JobState::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    /// The fieldless status tag.
    pub fn status(&self) -> JobStatus {
        self.state.status()
    }
}
