//! Background job processing for PdfPress.
//!
//! This crate provides:
//! - A worker pool that polls the queue and dispatches jobs
//! - A job runner that drives one job through claim, optimize, publish

pub mod pool;
pub mod runner;

pub use pool::WorkerPool;
pub use runner::{JobOutcome, JobRunner};
