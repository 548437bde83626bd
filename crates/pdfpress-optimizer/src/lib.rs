//! Optimizer adapter for PdfPress.
//!
//! The pipeline talks to the external tool through the narrow
//! [`PdfOptimizer`] trait, so nothing outside this crate depends on
//! how Ghostscript is invoked.

pub mod error;
pub mod ghostscript;
pub mod traits;

pub use error::OptimizeError;
pub use ghostscript::GhostscriptOptimizer;
pub use traits::PdfOptimizer;
