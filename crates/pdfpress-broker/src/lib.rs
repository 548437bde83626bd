//! # pdfpress-broker
//!
//! Job store and work queue providers for PdfPress. Supports two modes:
//!
//! - **redis**: production backend using the [redis](https://crates.io/crates/redis)
//!   crate; one hash per job, one list as the FIFO queue, and a server-side
//!   Lua script for the guarded status transition
//! - **memory**: in-process backend for tests and single-node runs
//!
//! The provider is selected at runtime based on configuration. The queue
//! carries job ids only; the store stays the single source of truth for
//! job data.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod traits;

pub use provider::BrokerManager;
pub use traits::{JobQueue, JobStore};
