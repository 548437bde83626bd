//! Job intake, status, and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use pdfpress_core::error::{AppError, ErrorKind};
use pdfpress_core::types::JobId;
use pdfpress_entity::job::{Dpi, Job, JpegQuality, OptimizeParams};
use pdfpress_entity::validate::{UploadGuard, ValidationError, download_filename, sanitize_filename};
use pdfpress_storage::UploadSink;

use crate::dto::response::{JobCreatedResponse, JobResponse};
use crate::state::AppState;

/// Raw optimization parameters as they arrived in the multipart body.
#[derive(Debug, Default)]
struct RawParams {
    dpi: Option<String>,
    jpegq: Option<String>,
}

/// An upload already persisted to the artifact store.
#[derive(Debug)]
struct StoredUpload {
    id: JobId,
    original_filename: String,
    input_path: String,
    bytes: u64,
}

/// POST /api/jobs — multipart upload that creates and enqueues a job.
///
/// Fields: `file` (required, binary), `dpi` and `jpegq` (optional text,
/// defaulted when absent). Field order is not significant.
pub async fn create_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<JobCreatedResponse>), AppError> {
    let (params, upload) = read_multipart(&state, multipart).await?;
    let stored = upload.ok_or_else(|| AppError::from(ValidationError::MissingFile))?;
    let response = finalize_job(&state, &params, stored).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /api/jobs/{id} — return the full job record.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, AppError> {
    let id: JobId = id.parse()?;
    let job = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("job not found"))?;

    tracing::debug!("Job status retrieved: {} - {}", job.id, job.status());
    Ok(Json(JobResponse::from(&job)))
}

/// GET /api/jobs/{id}/download — stream the optimized document.
pub async fn download_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id: JobId = id.parse()?;
    let job = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("job not found"))?;

    let Some(output_path) = job.state.output_path() else {
        tracing::info!(
            "Download attempted for incomplete job {} (status={})",
            id,
            job.status()
        );
        return Err(AppError::not_ready(format!(
            "not ready (status={})",
            job.status()
        )));
    };

    // The record says done, so a missing file is an internal fault, not
    // a client error.
    let (stream, len) = match state.artifacts.open_download(output_path).await {
        Ok(opened) => opened,
        Err(e) if e.kind == ErrorKind::NotFound => {
            tracing::error!("Output file missing for job {}: {}", id, output_path);
            return Err(AppError::internal("output missing"));
        }
        Err(e) => return Err(e),
    };

    let filename = download_filename(&job.original_filename);
    tracing::info!("Downloading job {}", id);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// Walk the multipart body, persisting the file field as it streams.
///
/// On any error the partially stored upload is removed before
/// returning, so a rejected request leaves nothing behind.
async fn read_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(RawParams, Option<StoredUpload>), AppError> {
    let mut params = RawParams::default();
    let mut upload: Option<StoredUpload> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                abort_intake(state, &upload).await;
                return Err(AppError::validation(format!("Multipart error: {e}")));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        let outcome = match name.as_str() {
            "dpi" => read_text(field).await.map(|v| params.dpi = Some(v)),
            "jpegq" => read_text(field).await.map(|v| params.jpegq = Some(v)),
            "file" => {
                if upload.is_some() {
                    Err(AppError::validation("Duplicate file field"))
                } else {
                    stream_upload(state, field).await.map(|u| upload = Some(u))
                }
            }
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            abort_intake(state, &upload).await;
            return Err(e);
        }
    }

    Ok((params, upload))
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Read error: {e}")))
}

/// Stream one file field through the upload guard into the sink.
async fn stream_upload(state: &AppState, mut field: Field<'_>) -> Result<StoredUpload, AppError> {
    let original_filename = sanitize_filename(field.file_name().unwrap_or("input.pdf"));

    let id = JobId::generate();
    let mut guard = UploadGuard::new(state.config.server.max_upload_bytes());
    let mut sink = state.artifacts.begin_upload(id).await?;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                sink.abort().await;
                return Err(AppError::validation(format!("Upload read error: {e}")));
            }
        };
        // Size and signature are checked before the chunk is written, so
        // an oversized upload never lands fully on disk.
        if let Err(e) = guard.accept(&chunk) {
            sink.abort().await;
            return Err(e.into());
        }
        if let Err(e) = sink.write_chunk(&chunk).await {
            sink.abort().await;
            return Err(e);
        }
    }

    let bytes = match guard.finish() {
        Ok(bytes) => bytes,
        Err(e) => {
            sink.abort().await;
            return Err(e.into());
        }
    };

    finish_sink(state, id, sink).await?;
    Ok(StoredUpload {
        id,
        original_filename,
        input_path: state.artifacts.upload_rel(id),
        bytes,
    })
}

async fn finish_sink(state: &AppState, id: JobId, sink: UploadSink) -> Result<(), AppError> {
    if let Err(e) = sink.finish().await {
        state.artifacts.discard_upload(id).await;
        return Err(e);
    }
    Ok(())
}

async fn abort_intake(state: &AppState, upload: &Option<StoredUpload>) {
    if let Some(stored) = upload {
        state.artifacts.discard_upload(stored.id).await;
    }
}

/// Validate parameters, persist the record, and enqueue the job.
async fn finalize_job(
    state: &AppState,
    params: &RawParams,
    stored: StoredUpload,
) -> Result<JobCreatedResponse, AppError> {
    let params = match parse_params(params) {
        Ok(params) => params,
        Err(e) => {
            state.artifacts.discard_upload(stored.id).await;
            return Err(e);
        }
    };

    let job = Job::new(
        stored.id,
        params,
        stored.original_filename,
        stored.input_path,
    );
    tracing::info!(
        "Creating job {} for file {} (dpi={}, jpegq={})",
        job.id,
        job.original_filename,
        params.dpi.value(),
        params.jpegq.value()
    );

    if let Err(e) = state.store.create(&job).await {
        state.artifacts.discard_upload(stored.id).await;
        return Err(e);
    }

    // Past this point the record exists and references the upload, so
    // the artifact stays in place even if the enqueue fails.
    state.queue.enqueue(job.id).await?;
    tracing::info!("Job {} queued successfully ({} bytes)", job.id, stored.bytes);

    let base = state.config.server.public_base();
    Ok(JobCreatedResponse {
        job_id: job.id,
        status: job.status(),
        status_url: format!("{base}/api/jobs/{}", job.id),
        download_url: format!("{base}/api/jobs/{}/download", job.id),
    })
}

fn parse_params(raw: &RawParams) -> Result<OptimizeParams, AppError> {
    let dpi = match &raw.dpi {
        Some(raw) => raw.parse::<Dpi>()?,
        None => Dpi::default(),
    };
    let jpegq = match &raw.jpegq {
        Some(raw) => raw.parse::<JpegQuality>()?,
        None => JpegQuality::default(),
    };
    Ok(OptimizeParams { dpi, jpegq })
}
