//! Optimizer error types.

/// Errors from running the external optimization tool.
///
/// The worker records the Display form of these in the job's `error`
/// field, so each message must stand alone as a diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    /// The configured binary could not be spawned.
    #[error("optimizer binary not found: {binary}")]
    BinaryNotFound {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran past the configured wall-clock limit and was killed.
    #[error("optimization timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    /// The tool exited non-zero. `stderr` is already truncated for storage.
    #[error("ghostscript exited with {}: {stderr}", exit_code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")))]
    ProcessFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The tool exited zero but wrote no output file.
    #[error("optimizer produced no output file")]
    OutputMissing,

    /// The output file is empty or does not start with a PDF header.
    #[error("optimizer output is empty or not a valid PDF")]
    OutputInvalid,

    /// Any other I/O failure around the tool invocation.
    #[error("I/O error during optimization: {0}")]
    Io(#[from] std::io::Error),
}
