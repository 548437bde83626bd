//! Ghostscript invocation.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use pdfpress_core::config::optimizer::OptimizerConfig;
use pdfpress_entity::job::OptimizeParams;

use crate::error::OptimizeError;
use crate::traits::PdfOptimizer;

/// Cap on the stderr excerpt stored as a failure diagnostic.
const MAX_STDERR_CHARS: usize = 4000;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// [`PdfOptimizer`] backed by the Ghostscript `pdfwrite` device.
///
/// Images are downsampled to the job's DPI with average filtering and
/// recompressed at the job's JPEG quality, which is where web-size
/// reductions come from on scanned documents.
#[derive(Debug, Clone)]
pub struct GhostscriptOptimizer {
    binary: String,
    timeout: Duration,
}

impl GhostscriptOptimizer {
    /// Create an optimizer from configuration.
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl PdfOptimizer for GhostscriptOptimizer {
    async fn optimize(
        &self,
        input: &Path,
        output: &Path,
        params: OptimizeParams,
    ) -> Result<u64, OptimizeError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(command_args(input, output, params))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            binary = %self.binary,
            input = %input.display(),
            dpi = params.dpi.value(),
            jpegq = params.jpegq.value(),
            "Running Ghostscript"
        );

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OptimizeError::BinaryNotFound {
                    binary: self.binary.clone(),
                    source: e,
                }
            } else {
                OptimizeError::Io(e)
            }
        })?;

        // When the timeout fires the child future is dropped, and
        // kill_on_drop reaps the process.
        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(done) => done?,
            Err(_) => {
                return Err(OptimizeError::Timeout {
                    timeout_seconds: self.timeout.as_secs(),
                });
            }
        };

        if !result.status.success() {
            return Err(OptimizeError::ProcessFailed {
                exit_code: result.status.code(),
                stderr: failure_detail(&result.stderr),
            });
        }

        verify_output(output).await
    }
}

/// Build the Ghostscript argument list for one job.
fn command_args(input: &Path, output: &Path, params: OptimizeParams) -> Vec<OsString> {
    let dpi = params.dpi.value();
    let jpegq = params.jpegq.value();

    let mut args: Vec<OsString> = vec![
        "-sDEVICE=pdfwrite".into(),
        "-dCompatibilityLevel=1.4".into(),
        "-dDownsampleColorImages=true".into(),
        format!("-dColorImageResolution={dpi}").into(),
        "-dDownsampleGrayImages=true".into(),
        format!("-dGrayImageResolution={dpi}").into(),
        "-dDownsampleMonoImages=true".into(),
        format!("-dMonoImageResolution={dpi}").into(),
        "-dColorImageDownsampleType=/Average".into(),
        "-dGrayImageDownsampleType=/Average".into(),
        "-dMonoImageDownsampleType=/Average".into(),
        format!("-dJPEGQ={jpegq}").into(),
        "-dNOPAUSE".into(),
        "-dQUIET".into(),
        "-dBATCH".into(),
    ];

    let mut out_flag = OsString::from("-sOutputFile=");
    out_flag.push(output.as_os_str());
    args.push(out_flag);
    args.push(input.as_os_str().to_os_string());
    args
}

/// Prepare a stored failure diagnostic from raw stderr.
fn failure_detail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "Ghostscript failed".to_string();
    }
    trimmed.chars().take(MAX_STDERR_CHARS).collect()
}

/// Check that the tool actually produced a plausible PDF.
///
/// Ghostscript can exit zero while writing nothing useful, so a zero
/// exit alone does not mark a job done.
async fn verify_output(path: &Path) -> Result<u64, OptimizeError> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(OptimizeError::OutputMissing);
        }
        Err(e) => return Err(OptimizeError::Io(e)),
    };
    if meta.len() < PDF_MAGIC.len() as u64 {
        return Err(OptimizeError::OutputInvalid);
    }

    let mut file = tokio::fs::File::open(path).await?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic).await?;
    if &magic != PDF_MAGIC {
        return Err(OptimizeError::OutputInvalid);
    }
    Ok(meta.len())
}
