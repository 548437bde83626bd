//! Shared test helpers for integration tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use pdfpress_api::{AppState, build_app};
use pdfpress_broker::memory::{MemoryJobQueue, MemoryJobStore};
use pdfpress_broker::{JobQueue, JobStore};
use pdfpress_core::config::AppConfig;
use pdfpress_entity::job::OptimizeParams;
use pdfpress_optimizer::{OptimizeError, PdfOptimizer};
use pdfpress_storage::ArtifactStore;
use pdfpress_worker::{JobOutcome, JobRunner};

/// Multipart boundary used by the upload helpers.
const BOUNDARY: &str = "pdfpress-test-boundary";

/// Payload written by [`FakeOptimizer`].
pub const FAKE_OUTPUT: &[u8] = b"%PDF-1.4\nfake optimized output\n";

/// Optimizer stand-in that writes a fixed payload to the output path.
#[derive(Debug)]
pub struct FakeOptimizer;

#[async_trait]
impl PdfOptimizer for FakeOptimizer {
    async fn optimize(
        &self,
        _input: &Path,
        output: &Path,
        _params: OptimizeParams,
    ) -> Result<u64, OptimizeError> {
        tokio::fs::write(output, FAKE_OUTPUT).await?;
        Ok(FAKE_OUTPUT.len() as u64)
    }
}

/// Optimizer stand-in that always reports a tool failure.
#[derive(Debug)]
pub struct FailingOptimizer;

#[async_trait]
impl PdfOptimizer for FailingOptimizer {
    async fn optimize(
        &self,
        _input: &Path,
        _output: &Path,
        _params: OptimizeParams,
    ) -> Result<u64, OptimizeError> {
        Err(OptimizeError::ProcessFailed {
            exit_code: Some(1),
            stderr: "Error: /ioerror in --showpage--".into(),
        })
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Job store shared with the router
    pub store: Arc<dyn JobStore>,
    /// Work queue shared with the router
    pub queue: Arc<dyn JobQueue>,
    /// Artifact store rooted in a per-test temp directory
    pub artifacts: Arc<ArtifactStore>,
    /// Application config
    pub config: AppConfig,
    _data_dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a test application with default configuration.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application, adjusting the configuration first.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.root = data_dir.path().display().to_string();
        config.broker.provider = "memory".to_string();
        tweak(&mut config);

        let artifacts = Arc::new(
            ArtifactStore::new(&config.storage.root)
                .await
                .expect("Failed to init artifact store"),
        );
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let queue: Arc<dyn JobQueue> = Arc::new(MemoryJobQueue::new());

        let state = AppState {
            config: Arc::new(config.clone()),
            store: Arc::clone(&store),
            queue: Arc::clone(&queue),
            artifacts: Arc::clone(&artifacts),
        };

        Self {
            router: build_app(state),
            store,
            queue,
            artifacts,
            config,
            _data_dir: data_dir,
        }
    }

    /// Upload a file through POST /api/jobs with optional extra fields.
    pub async fn upload(
        &self,
        filename: &str,
        content: &[u8],
        fields: &[(&str, &str)],
    ) -> TestResponse {
        self.post_multipart(Some((filename, content)), fields).await
    }

    /// POST a multipart body that carries no file field.
    pub async fn upload_without_file(&self, fields: &[(&str, &str)]) -> TestResponse {
        self.post_multipart(None, fields).await
    }

    /// Make a GET request to the test app.
    pub async fn get(&self, path: &str) -> TestResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Dequeue the next job id and run it through a fresh runner.
    pub async fn process_next(&self, optimizer: Arc<dyn PdfOptimizer>) -> JobOutcome {
        let id = self
            .queue
            .dequeue()
            .await
            .expect("dequeue failed")
            .expect("queue is empty");
        let runner = JobRunner::new(
            Arc::clone(&self.store),
            Arc::clone(&self.artifacts),
            optimizer,
        );
        runner.process(id).await
    }

    /// Number of files currently stored in the uploads directory.
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.artifacts.root().join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn post_multipart(
        &self,
        file: Option<(&str, &[u8])>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/jobs")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(file, fields)))
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Encode text fields and an optional file part as multipart/form-data.
fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, content)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub bytes: Bytes,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
}
