//! Job runner — drives one job from claim to terminal state.

use std::sync::Arc;

use tracing;

use pdfpress_broker::JobStore;
use pdfpress_core::error::ErrorKind;
use pdfpress_core::types::JobId;
use pdfpress_entity::job::{Job, JobState, JobStatus};
use pdfpress_optimizer::PdfOptimizer;
use pdfpress_storage::ArtifactStore;

/// How one dequeued id was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job reached `done` with a published output.
    Completed,
    /// The job reached `failed`, or its terminal update could not be
    /// written.
    Failed,
    /// The id was stale: unknown, or already claimed by another worker.
    Skipped,
}

/// Executes the optimize pipeline for single jobs.
#[derive(Debug)]
pub struct JobRunner {
    /// Job store for claims and terminal transitions.
    store: Arc<dyn JobStore>,
    /// Artifact store for inputs, scratch space, and outputs.
    artifacts: Arc<ArtifactStore>,
    /// External optimization tool.
    optimizer: Arc<dyn PdfOptimizer>,
}

impl JobRunner {
    /// Create a new job runner.
    pub fn new(
        store: Arc<dyn JobStore>,
        artifacts: Arc<ArtifactStore>,
        optimizer: Arc<dyn PdfOptimizer>,
    ) -> Self {
        Self {
            store,
            artifacts,
            optimizer,
        }
    }

    /// Process one dequeued id to completion.
    ///
    /// Never returns an error: every failure is recorded on the job (or
    /// logged, for stale ids) so one bad job cannot stop the pool.
    pub async fn process(&self, id: JobId) -> JobOutcome {
        // Claim the job. Losing the claim is normal when a duplicate
        // queue entry or a worker restart races us.
        let job = match self
            .store
            .transition(id, JobStatus::Queued, JobState::Processing)
            .await
        {
            Ok(job) => job,
            Err(e) if e.kind == ErrorKind::Conflict => {
                tracing::debug!("Job {} already claimed, skipping: {}", id, e.message);
                return JobOutcome::Skipped;
            }
            Err(e) if e.kind == ErrorKind::NotFound => {
                tracing::warn!("Dequeued unknown job {}, skipping", id);
                return JobOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!("Failed to claim job {}: {}", id, e);
                return JobOutcome::Skipped;
            }
        };

        match self.optimize_and_publish(&job).await {
            Ok((input_size, output_size, output_path)) => {
                let reduction = if input_size > 0 {
                    (1.0 - output_size as f64 / input_size as f64) * 100.0
                } else {
                    0.0
                };
                match self
                    .store
                    .transition(job.id, JobStatus::Processing, JobState::Done { output_path })
                    .await
                {
                    Ok(_) => {
                        tracing::info!(
                            "Job {} completed: {} -> {} bytes ({:.1}% reduction)",
                            job.id,
                            input_size,
                            output_size,
                            reduction
                        );
                        JobOutcome::Completed
                    }
                    Err(e) => {
                        tracing::error!("Failed to mark job {} as done: {}", job.id, e);
                        JobOutcome::Failed
                    }
                }
            }
            Err(detail) => {
                self.artifacts.discard_scratch(job.id).await;
                tracing::error!("Job {} failed: {}", job.id, detail);
                if let Err(e) = self
                    .store
                    .transition(
                        job.id,
                        JobStatus::Processing,
                        JobState::Failed { error: detail },
                    )
                    .await
                {
                    tracing::error!("Failed to mark job {} as failed: {}", job.id, e);
                }
                JobOutcome::Failed
            }
        }
    }

    /// Run the tool against a claimed job and publish its output.
    ///
    /// The error string is the diagnostic stored on the job record.
    async fn optimize_and_publish(&self, job: &Job) -> Result<(u64, u64, String), String> {
        let input = self.artifacts.resolve(&job.input_path);
        let input_size = self
            .artifacts
            .file_size(&job.input_path)
            .await
            .map_err(|e| format!("input artifact unavailable: {e}"))?;

        let scratch = self.artifacts.scratch_path(job.id);
        let output_size = self
            .optimizer
            .optimize(&input, &scratch, job.params)
            .await
            .map_err(|e| e.to_string())?;

        let output_path = self
            .artifacts
            .publish(job.id)
            .await
            .map_err(|e| format!("failed to publish output: {e}"))?;
        Ok((input_size, output_size, output_path))
    }
}
