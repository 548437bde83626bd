//! Store and queue contracts implemented by the broker backends.

use async_trait::async_trait;

use pdfpress_core::result::AppResult;
use pdfpress_core::types::JobId;
use pdfpress_entity::job::{Job, JobState, JobStatus};

/// The authoritative record of job identity, parameters, and status.
///
/// Everything else in the system communicates through this store; workers
/// and the API never talk to each other directly.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a freshly created job.
    ///
    /// Fails with a conflict if a record with the same id already exists,
    /// which keeps id uniqueness an invariant of the store rather than a
    /// statistical property of the generator.
    async fn create(&self, job: &Job) -> AppResult<()>;

    /// Fetch a job by id. Returns `None` for an unknown id.
    async fn get(&self, id: JobId) -> AppResult<Option<Job>>;

    /// Guarded status transition (compare-and-swap on the status tag).
    ///
    /// Atomically moves the job into `to` if and only if its current
    /// status equals `from`; fails with a conflict otherwise. This is the
    /// sole concurrency-control primitive in the pipeline: a stale or
    /// duplicate worker loses the swap instead of overwriting later state.
    async fn transition(&self, id: JobId, from: JobStatus, to: JobState) -> AppResult<Job>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// FIFO work queue carrying job ids.
///
/// No priority, no delay, no dedup. Duplicate enqueues of the same id
/// produce duplicate dequeues; the store's guarded transition renders the
/// extra deliveries harmless.
#[async_trait]
pub trait JobQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Append an id to the tail of the queue.
    async fn enqueue(&self, id: JobId) -> AppResult<()>;

    /// Remove and return the id at the head of the queue.
    ///
    /// Atomic per consumer: two concurrent dequeues can never observe the
    /// same id. Returns `None` when the queue is empty; workers poll
    /// rather than block.
    async fn dequeue(&self) -> AppResult<Option<JobId>>;

    /// Number of ids currently waiting.
    async fn len(&self) -> AppResult<u64>;

    /// Check that the backing queue is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
