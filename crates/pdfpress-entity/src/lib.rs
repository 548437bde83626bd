//! # pdfpress-entity
//!
//! Domain entities for PdfPress: the job record and its state machine,
//! the validated optimization parameters, and upload validation.

pub mod job;
pub mod validate;

pub use job::{Job, JobState, JobStatus};
pub use validate::ValidationError;
