//! Integration tests for the health endpoint.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_reports_all_components() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["components"]["store"], "healthy");
    assert_eq!(response.body["components"]["queue"], "healthy");
    assert_eq!(response.body["components"]["storage"], "healthy");
}

#[tokio::test]
async fn test_health_degrades_when_storage_is_broken() {
    let app = TestApp::new().await;
    std::fs::remove_dir_all(app.artifacts.root().join("uploads")).expect("remove uploads dir");

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["status"], "unhealthy");
    assert_eq!(response.body["components"]["storage"], "unhealthy");
    // The broker side is unaffected and still reported per component.
    assert_eq!(response.body["components"]["store"], "healthy");
    assert_eq!(response.body["components"]["queue"], "healthy");
}
