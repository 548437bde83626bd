//! Integration tests for the job lifecycle from upload to download.

use std::sync::Arc;

use http::{StatusCode, header};
use serde_json::Value;

use pdfpress_core::types::JobId;
use pdfpress_entity::job::{JobState, JobStatus};
use pdfpress_worker::JobOutcome;

use crate::helpers::{FAKE_OUTPUT, FailingOptimizer, FakeOptimizer, TestApp};

/// Source document used by the lifecycle tests.
const SOURCE_PDF: &[u8] = b"%PDF-1.4\nsource document content\n";

/// Upload a source document and return the accepted job id.
async fn create_job(app: &TestApp, filename: &str) -> String {
    let response = app.upload(filename, SOURCE_PDF, &[]).await;
    assert_eq!(response.status, StatusCode::ACCEPTED, "{:?}", response.body);
    response.body["job_id"]
        .as_str()
        .expect("job_id in response")
        .to_string()
}

/// Fetch the current status string for a job.
async fn job_status(app: &TestApp, id: &str) -> String {
    let response = app.get(&format!("/api/jobs/{id}")).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["status"]
        .as_str()
        .expect("status in response")
        .to_string()
}

#[tokio::test]
async fn test_job_lifecycle_reaches_done_and_downloads() {
    let app = TestApp::new().await;
    let job_id = create_job(&app, "scan.pdf").await;
    assert_eq!(job_status(&app, &job_id).await, "queued");

    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Completed
    );

    let status = app.get(&format!("/api/jobs/{job_id}")).await;
    assert_eq!(status.body["status"], "done");
    assert_eq!(
        status.body["output_path"],
        format!("outputs/{job_id}_web.pdf")
    );
    assert_eq!(status.body["error"], Value::Null);

    let download = app.get(&format!("/api/jobs/{job_id}/download")).await;
    assert_eq!(download.status, StatusCode::OK);
    let content_type = download
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .expect("content-type header");
    assert_eq!(content_type, "application/pdf");
    let disposition = download
        .headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition header");
    assert_eq!(disposition, "attachment; filename=\"scan_web.pdf\"");
    let content_length = download
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .expect("content-length header");
    assert_eq!(content_length, FAKE_OUTPUT.len().to_string());
    assert!(download.bytes.starts_with(b"%PDF"));
    assert_eq!(download.bytes.as_ref(), FAKE_OUTPUT);
}

#[tokio::test]
async fn test_status_tracks_processing_claim() {
    let app = TestApp::new().await;
    let job_id = create_job(&app, "scan.pdf").await;
    let id: JobId = job_id.parse().expect("valid id");

    // Claim the job the way a worker would, without finishing it.
    app.store
        .transition(id, JobStatus::Queued, JobState::Processing)
        .await
        .expect("claim job");

    assert_eq!(job_status(&app, &job_id).await, "processing");

    let download = app.get(&format!("/api/jobs/{job_id}/download")).await;
    assert_eq!(download.status, StatusCode::CONFLICT);
    assert_eq!(download.body["error"], "NOT_READY");
    assert_eq!(download.body["message"], "not ready (status=processing)");
}

#[tokio::test]
async fn test_failed_job_reports_tool_diagnostic() {
    let app = TestApp::new().await;
    let job_id = create_job(&app, "scan.pdf").await;

    assert_eq!(
        app.process_next(Arc::new(FailingOptimizer)).await,
        JobOutcome::Failed
    );

    let status = app.get(&format!("/api/jobs/{job_id}")).await;
    assert_eq!(status.body["status"], "failed");
    let error = status.body["error"].as_str().expect("error in response");
    assert!(error.contains("ghostscript exited with code 1"), "{error}");
    assert!(error.contains("/ioerror"), "{error}");
    assert_eq!(status.body["output_path"], Value::Null);

    let download = app.get(&format!("/api/jobs/{job_id}/download")).await;
    assert_eq!(download.status, StatusCode::CONFLICT);
    assert_eq!(download.body["error"], "NOT_READY");
    assert_eq!(download.body["message"], "not ready (status=failed)");

    // The source upload is kept for inspection; only scratch output is
    // cleaned up.
    assert_eq!(app.upload_count(), 1);
}

#[tokio::test]
async fn test_download_name_follows_the_upload() {
    let app = TestApp::new().await;
    let job_id = create_job(&app, "Q3 Report (draft).pdf").await;

    let status = app.get(&format!("/api/jobs/{job_id}")).await;
    assert_eq!(status.body["original_filename"], "Q3Reportdraft.pdf");

    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Completed
    );

    let download = app.get(&format!("/api/jobs/{job_id}/download")).await;
    let disposition = download
        .headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition header");
    assert_eq!(disposition, "attachment; filename=\"Q3Reportdraft_web.pdf\"");
}

#[tokio::test]
async fn test_duplicate_delivery_is_harmless() {
    let app = TestApp::new().await;
    let job_id = create_job(&app, "scan.pdf").await;
    let id: JobId = job_id.parse().expect("valid id");

    // A second queue entry for the same id, as a crashed producer or a
    // redelivery would leave behind.
    app.queue.enqueue(id).await.expect("duplicate enqueue");
    assert_eq!(app.queue.len().await.expect("queue len"), 2);

    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Completed
    );
    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Skipped
    );

    // The first result stands untouched.
    assert_eq!(job_status(&app, &job_id).await, "done");
    let download = app.get(&format!("/api/jobs/{job_id}/download")).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.bytes.as_ref(), FAKE_OUTPUT);
}

#[tokio::test]
async fn test_jobs_complete_in_submission_order() {
    let app = TestApp::new().await;
    let first = create_job(&app, "first.pdf").await;
    let second = create_job(&app, "second.pdf").await;
    let third = create_job(&app, "third.pdf").await;

    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Completed
    );
    assert_eq!(job_status(&app, &first).await, "done");
    assert_eq!(job_status(&app, &second).await, "queued");
    assert_eq!(job_status(&app, &third).await, "queued");

    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Completed
    );
    assert_eq!(job_status(&app, &second).await, "done");
    assert_eq!(job_status(&app, &third).await, "queued");

    assert_eq!(
        app.process_next(Arc::new(FakeOptimizer)).await,
        JobOutcome::Completed
    );
    assert_eq!(job_status(&app, &third).await, "done");
}

#[tokio::test]
async fn test_racing_workers_claim_exactly_once() {
    let app = Arc::new(TestApp::new().await);
    let job_id = create_job(&app, "scan.pdf").await;
    let id: JobId = job_id.parse().expect("valid id");

    // Five queue entries for one job, five workers racing to claim it.
    for _ in 0..4 {
        app.queue.enqueue(id).await.expect("duplicate enqueue");
    }
    let mut handles = Vec::new();
    for _ in 0..5 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.process_next(Arc::new(FakeOptimizer)).await
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("worker task"));
    }

    let completed = outcomes
        .iter()
        .filter(|o| **o == JobOutcome::Completed)
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| **o == JobOutcome::Skipped)
        .count();
    assert_eq!(completed, 1, "outcomes: {outcomes:?}");
    assert_eq!(skipped, 4, "outcomes: {outcomes:?}");

    assert_eq!(job_status(&app, &job_id).await, "done");
    let download = app.get(&format!("/api/jobs/{job_id}/download")).await;
    assert_eq!(download.status, StatusCode::OK);
}
