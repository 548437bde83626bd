//! In-memory broker providers for single-process deployments and tests.

pub mod queue;
pub mod store;

pub use queue::MemoryJobQueue;
pub use store::MemoryJobStore;
