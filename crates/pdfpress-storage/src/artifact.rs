//! Artifact store rooted at a single local directory.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use pdfpress_core::error::{AppError, ErrorKind};
use pdfpress_core::result::AppResult;
use pdfpress_core::types::JobId;

use crate::stream::ByteStream;

const UPLOADS_DIR: &str = "uploads";
const OUTPUTS_DIR: &str = "outputs";
const TMP_DIR: &str = "tmp";

/// Local artifact store for job inputs and outputs.
///
/// Job records carry paths relative to the store root, so the root can
/// be relocated between deployments without rewriting records.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Root directory for all artifacts.
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given path, creating the layout
    /// directories if they do not exist.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        for dir in [UPLOADS_DIR, OUTPUTS_DIR, TMP_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create storage directory: {}", path.display()),
                    e,
                )
            })?;
        }
        Ok(Self { root })
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a root-relative path to an absolute path.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }

    /// Root-relative path of a job's uploaded input.
    pub fn upload_rel(&self, id: JobId) -> String {
        format!("{UPLOADS_DIR}/{id}.pdf")
    }

    /// Root-relative path of a job's published output.
    pub fn output_rel(&self, id: JobId) -> String {
        format!("{OUTPUTS_DIR}/{id}_web.pdf")
    }

    /// Absolute path of a job's optimizer scratch output.
    pub fn scratch_path(&self, id: JobId) -> PathBuf {
        self.root.join(TMP_DIR).join(format!("{id}.pdf"))
    }

    /// Start a streaming upload for a job's input artifact.
    pub async fn begin_upload(&self, id: JobId) -> AppResult<UploadSink> {
        let rel = self.upload_rel(id);
        let path = self.resolve(&rel);
        let file = fs::File::create(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create upload file: {rel}"),
                e,
            )
        })?;
        Ok(UploadSink {
            file,
            path,
            rel,
            bytes_written: 0,
        })
    }

    /// Open a stored artifact for streaming, returning its size.
    pub async fn open_download(&self, rel: &str) -> AppResult<(ByteStream, u64)> {
        let path = self.resolve(rel);
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Artifact not found: {rel}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open artifact: {rel}"),
                    e,
                )
            }
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to stat artifact: {rel}"),
                    e,
                )
            })?
            .len();
        Ok((Box::pin(ReaderStream::new(file)), len))
    }

    /// Size in bytes of a stored artifact.
    pub async fn file_size(&self, rel: &str) -> AppResult<u64> {
        let path = self.resolve(rel);
        let meta = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Artifact not found: {rel}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to stat artifact: {rel}"),
                    e,
                )
            }
        })?;
        Ok(meta.len())
    }

    /// Publish a job's scratch output by renaming it into `outputs/`.
    ///
    /// Rename is atomic on one filesystem, so readers only ever see the
    /// complete file. Returns the published root-relative path.
    pub async fn publish(&self, id: JobId) -> AppResult<String> {
        let scratch = self.scratch_path(id);
        let rel = self.output_rel(id);
        let target = self.resolve(&rel);
        fs::rename(&scratch, &target).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to publish output for job {id}"),
                e,
            )
        })?;
        debug!(job_id = %id, path = %rel, "Published output artifact");
        Ok(rel)
    }

    /// Remove a job's uploaded input if present. Used when intake fails
    /// after the upload was stored but before a job record exists.
    pub async fn discard_upload(&self, id: JobId) {
        let path = self.resolve(&self.upload_rel(id));
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(job_id = %id, error = %e, "Failed to remove uploaded input");
            }
        }
    }

    /// Remove a job's scratch output if present. Failure to clean up is
    /// logged, never surfaced.
    pub async fn discard_scratch(&self, id: JobId) {
        let scratch = self.scratch_path(id);
        match fs::remove_file(&scratch).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(job_id = %id, error = %e, "Failed to remove scratch output");
            }
        }
    }

    /// Whether the storage root is present and writable layout-wise.
    pub async fn health_check(&self) -> AppResult<bool> {
        for dir in [UPLOADS_DIR, OUTPUTS_DIR, TMP_DIR] {
            let path = self.root.join(dir);
            if !path.is_dir() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Sink for streaming one upload to disk chunk by chunk.
///
/// Callers must call [`UploadSink::finish`] on success or
/// [`UploadSink::abort`] on failure; an aborted sink removes the
/// partial file so rejected uploads leave nothing behind.
#[derive(Debug)]
pub struct UploadSink {
    file: fs::File,
    path: PathBuf,
    rel: String,
    bytes_written: u64,
}

impl UploadSink {
    /// Append one chunk to the upload.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()> {
        self.file.write_all(chunk).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write upload chunk: {}", self.rel),
                e,
            )
        })?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close the upload, returning the total bytes written.
    pub async fn finish(mut self) -> AppResult<u64> {
        self.file.flush().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to flush upload: {}", self.rel),
                e,
            )
        })?;
        debug!(path = %self.rel, bytes = self.bytes_written, "Stored upload");
        Ok(self.bytes_written)
    }

    /// Discard the upload and remove the partial file.
    pub async fn abort(self) {
        drop(self.file);
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.rel, error = %e, "Failed to remove partial upload");
            }
        }
    }

    /// Root-relative path the upload is being written to.
    pub fn rel_path(&self) -> &str {
        &self.rel
    }
}
