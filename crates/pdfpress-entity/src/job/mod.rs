//! Optimization job domain entities.

pub mod model;
pub mod params;
pub mod state;

pub use model::Job;
pub use params::{Dpi, JpegQuality, OptimizeParams};
pub use state::{JobState, JobStatus};
