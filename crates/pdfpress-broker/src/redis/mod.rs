//! Redis broker backend.

pub mod client;
pub mod queue;
pub mod store;

pub use client::RedisClient;
pub use queue::RedisJobQueue;
pub use store::RedisJobStore;
