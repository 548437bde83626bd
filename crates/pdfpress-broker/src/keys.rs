//! Key builders for all broker entries.
//!
//! Centralising key construction prevents typos and makes it easy to find
//! every key the application uses. The configured key prefix is applied by
//! the Redis client, not here.

use pdfpress_core::types::JobId;

/// Name of the single work queue.
const QUEUE_NAME: &str = "pdf";

/// Key of the hash holding a job record.
pub fn job(id: JobId) -> String {
    format!("job:{id}")
}

/// Key of the FIFO work queue list.
pub fn queue() -> String {
    format!("queue:{QUEUE_NAME}")
}
