//! Optimizer contract.

use std::path::Path;

use async_trait::async_trait;

use pdfpress_entity::job::OptimizeParams;

use crate::error::OptimizeError;

/// Narrow contract for the external optimization tool.
///
/// Implementations write the optimized document to `output` (expected
/// to be a scratch path, never the final published location) and return
/// the output size in bytes. A successful return guarantees `output`
/// exists, is non-empty, and carries a PDF header.
#[async_trait]
pub trait PdfOptimizer: Send + Sync + std::fmt::Debug + 'static {
    /// Optimize `input` into `output` with the given parameters.
    async fn optimize(
        &self,
        input: &Path,
        output: &Path,
        params: OptimizeParams,
    ) -> Result<u64, OptimizeError>;
}
