//! Response DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pdfpress_core::types::JobId;
use pdfpress_entity::job::{Job, JobStatus, OptimizeParams};

/// Response for `POST /api/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreatedResponse {
    /// Identifier of the accepted job.
    pub job_id: JobId,
    /// Always `queued` at creation time.
    pub status: JobStatus,
    /// Absolute URL for polling the job record.
    pub status_url: String,
    /// Absolute URL for fetching the optimized document once done.
    pub download_url: String,
}

/// Full job record as returned by `GET /api/jobs/{id}`.
///
/// `output_path` and `error` are serialized as explicit nulls until the
/// job reaches the state that sets them, so clients can poll one stable
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub params: OptimizeParams,
    pub original_filename: String,
    pub input_path: String,
    pub output_path: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Job> for JobResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status(),
            params: job.params,
            original_filename: job.original_filename.clone(),
            input_path: job.input_path.clone(),
            output_path: job.state.output_path().map(String::from),
            error: job.state.error().map(String::from),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// Per-component health, keyed by component name.
    pub components: BTreeMap<String, String>,
}
