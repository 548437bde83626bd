//! Upload validation.
//!
//! Everything here is a pure gate: no job record is created and no durable
//! state survives a rejection. The guard is built for streaming intake, so
//! oversized uploads are rejected on the running total without buffering
//! the whole body.

use thiserror::Error;

use pdfpress_core::error::{AppError, ErrorKind};

/// Magic bytes every accepted upload must start with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Maximum length of a sanitized filename stem.
const MAX_STEM_LEN: usize = 150;

/// Fallback name when nothing usable survives sanitization.
const DEFAULT_FILENAME: &str = "file.pdf";

/// The closed set of reasons an upload can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The upload exceeded the configured size limit.
    #[error("file exceeds the maximum upload size of {max_mb} MB")]
    FileTooLarge {
        /// The configured limit in megabytes.
        max_mb: u64,
    },
    /// The first four bytes were not the `%PDF` marker.
    #[error("file does not start with the %PDF signature")]
    NotAPdf,
    /// The `dpi` parameter was missing from the enumerated set.
    #[error("unsupported dpi {value:?}: expected one of 96, 120, 150")]
    UnsupportedDpi {
        /// The rejected raw value.
        value: String,
    },
    /// The `jpegq` parameter was outside the accepted range.
    #[error("invalid jpegq {value:?}: expected an integer between 40 and 85")]
    InvalidJpegQuality {
        /// The rejected raw value.
        value: String,
    },
    /// The multipart body carried no file field.
    #[error("request is missing a file field")]
    MissingFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let kind = match err {
            ValidationError::FileTooLarge { .. } => ErrorKind::PayloadTooLarge,
            _ => ErrorKind::Validation,
        };
        AppError::new(kind, err.to_string())
    }
}

/// Streaming validator for uploaded content.
///
/// Feed every chunk through [`accept`](Self::accept) and call
/// [`finish`](Self::finish) once the stream ends. The guard checks the
/// size cap against the running total and the `%PDF` signature as soon as
/// four bytes have been seen, short-circuiting on the first failure.
#[derive(Debug)]
pub struct UploadGuard {
    max_bytes: u64,
    received: u64,
    signature_ok: bool,
    prefix: Vec<u8>,
}

impl UploadGuard {
    /// Create a guard enforcing the given byte limit.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            received: 0,
            signature_ok: false,
            prefix: Vec::with_capacity(PDF_MAGIC.len()),
        }
    }

    /// Validate the next chunk of the upload.
    pub fn accept(&mut self, chunk: &[u8]) -> Result<(), ValidationError> {
        self.received += chunk.len() as u64;
        if self.received > self.max_bytes {
            return Err(ValidationError::FileTooLarge {
                max_mb: self.max_bytes / (1024 * 1024),
            });
        }

        if !self.signature_ok {
            let needed = PDF_MAGIC.len() - self.prefix.len();
            self.prefix.extend_from_slice(&chunk[..needed.min(chunk.len())]);
            if self.prefix.len() == PDF_MAGIC.len() {
                if self.prefix.as_slice() != PDF_MAGIC {
                    return Err(ValidationError::NotAPdf);
                }
                self.signature_ok = true;
            }
        }

        Ok(())
    }

    /// Finish validation, returning the total byte count.
    ///
    /// Fails if the stream ended before a valid signature was seen, which
    /// covers empty and truncated uploads.
    pub fn finish(&self) -> Result<u64, ValidationError> {
        if !self.signature_ok {
            return Err(ValidationError::NotAPdf);
        }
        Ok(self.received)
    }

    /// Bytes accepted so far.
    pub fn bytes_received(&self) -> u64 {
        self.received
    }
}

/// Sanitize a client-supplied filename for display.
///
/// Strips directory components, drops everything outside ASCII
/// alphanumerics and `- _ .`, caps the stem length, and forces a `.pdf`
/// extension. The result is never used to build a filesystem path.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let stem = match cleaned.rfind('.') {
        Some(idx) => &cleaned[..idx],
        None => cleaned.as_str(),
    };
    let stem: String = stem.trim_matches('.').chars().take(MAX_STEM_LEN).collect();

    if stem.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }
    format!("{stem}.pdf")
}

/// Derive the attachment name for a job's optimized output.
pub fn download_filename(sanitized: &str) -> String {
    let stem = sanitized.strip_suffix(".pdf").unwrap_or(sanitized);
    format!("{stem}_web.pdf")
}
