//! Integration tests for job intake and read endpoints.

use http::StatusCode;
use serde_json::Value;

use pdfpress_core::types::JobId;

use crate::helpers::TestApp;

/// A minimal PDF-signed payload padded to the requested length.
fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut content = b"%PDF-1.4\n".to_vec();
    content.resize(len, b'x');
    content
}

#[tokio::test]
async fn test_create_job_returns_links() {
    let app = TestApp::new().await;

    let response = app
        .upload("scan.pdf", &pdf_bytes(512), &[("dpi", "120"), ("jpegq", "50")])
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED, "{:?}", response.body);
    let job_id = response.body["job_id"].as_str().expect("job_id in response");
    assert_eq!(job_id.len(), 32);
    assert!(job_id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    assert_eq!(response.body["status"], "queued");
    assert_eq!(
        response.body["status_url"],
        format!("http://localhost:8080/api/jobs/{job_id}")
    );
    assert_eq!(
        response.body["download_url"],
        format!("http://localhost:8080/api/jobs/{job_id}/download")
    );
    assert_eq!(app.queue.len().await.expect("queue len"), 1);
}

#[tokio::test]
async fn test_create_job_applies_parameters() {
    let app = TestApp::new().await;
    let created = app
        .upload("scan.pdf", &pdf_bytes(256), &[("dpi", "96"), ("jpegq", "40")])
        .await;
    assert_eq!(created.status, StatusCode::ACCEPTED);
    let job_id = created.body["job_id"].as_str().expect("job_id").to_string();

    let status = app.get(&format!("/api/jobs/{job_id}")).await;

    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["status"], "queued");
    assert_eq!(status.body["params"]["dpi"], 96);
    assert_eq!(status.body["params"]["jpegq"], 40);
    assert_eq!(status.body["original_filename"], "scan.pdf");
    assert_eq!(status.body["input_path"], format!("uploads/{job_id}.pdf"));
    assert_eq!(status.body["output_path"], Value::Null);
    assert_eq!(status.body["error"], Value::Null);
}

#[tokio::test]
async fn test_create_job_defaults_parameters() {
    let app = TestApp::new().await;
    let created = app.upload("scan.pdf", &pdf_bytes(256), &[]).await;
    let job_id = created.body["job_id"].as_str().expect("job_id").to_string();

    let status = app.get(&format!("/api/jobs/{job_id}")).await;

    assert_eq!(status.body["params"]["dpi"], 150);
    assert_eq!(status.body["params"]["jpegq"], 70);
}

#[tokio::test]
async fn test_create_job_accepts_boundary_parameters() {
    let app = TestApp::new().await;

    for (dpi, jpegq) in [("96", "40"), ("120", "85"), ("150", "70")] {
        let response = app
            .upload("scan.pdf", &pdf_bytes(64), &[("dpi", dpi), ("jpegq", jpegq)])
            .await;
        assert_eq!(
            response.status,
            StatusCode::ACCEPTED,
            "dpi={dpi} jpegq={jpegq}: {:?}",
            response.body
        );
    }
}

#[tokio::test]
async fn test_create_job_rejects_out_of_range_parameters() {
    let app = TestApp::new().await;

    let cases = [
        ("dpi", "95"),
        ("dpi", "151"),
        ("dpi", "72"),
        ("dpi", "abc"),
        ("jpegq", "39"),
        ("jpegq", "86"),
        ("jpegq", "7.5"),
    ];
    for (field, value) in cases {
        let response = app.upload("scan.pdf", &pdf_bytes(64), &[(field, value)]).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{field}={value}");
        assert_eq!(response.body["error"], "VALIDATION_ERROR", "{field}={value}");
    }

    // Every rejection happened after the upload was stored, so intake
    // must have cleaned up behind itself.
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.queue.len().await.expect("queue len"), 0);
}

#[tokio::test]
async fn test_create_job_rejects_non_pdf() {
    let app = TestApp::new().await;

    let response = app
        .upload("page.html", b"<html><body>hello</body></html>", &[])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(
        response.body["message"]
            .as_str()
            .expect("message")
            .contains("%PDF")
    );
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_create_job_rejects_empty_file() {
    let app = TestApp::new().await;

    let response = app.upload("empty.pdf", b"", &[]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_create_job_rejects_oversized_upload() {
    let app = TestApp::with_config(|config| config.server.max_upload_mb = 1).await;

    let response = app
        .upload("big.pdf", &pdf_bytes(1024 * 1024 + 1), &[])
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["error"], "PAYLOAD_TOO_LARGE");
    assert!(
        response.body["message"]
            .as_str()
            .expect("message")
            .contains(&format!("{} MB", app.config.server.max_upload_mb))
    );
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_create_job_requires_file_field() {
    let app = TestApp::new().await;

    let response = app.upload_without_file(&[("dpi", "120")]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["message"]
            .as_str()
            .expect("message")
            .contains("file")
    );
}

#[tokio::test]
async fn test_get_job_rejects_malformed_ids() {
    let app = TestApp::new().await;

    let cases = [
        "abc",
        "0123456789ABCDEF0123456789ABCDEF",  // uppercase
        "0123456789abcdef0123456789abcde",   // 31 chars
        "0123456789abcdef0123456789abcdef0", // 33 chars
        "0123456789abcdef0123456789abcdeg",  // non-hex
    ];
    for id in cases {
        let response = app.get(&format!("/api/jobs/{id}")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "id={id}");
        assert_eq!(response.body["error"], "VALIDATION_ERROR", "id={id}");
    }
}

#[tokio::test]
async fn test_get_job_unknown_id_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get(&format!("/api/jobs/{}", JobId::generate())).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_before_done_conflicts() {
    let app = TestApp::new().await;
    let created = app.upload("scan.pdf", &pdf_bytes(128), &[]).await;
    let job_id = created.body["job_id"].as_str().expect("job_id").to_string();

    let response = app.get(&format!("/api/jobs/{job_id}/download")).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "NOT_READY");
    assert_eq!(response.body["message"], "not ready (status=queued)");
}

#[tokio::test]
async fn test_download_unknown_id_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .get(&format!("/api/jobs/{}/download", JobId::generate()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}
