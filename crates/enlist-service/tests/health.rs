//! Health endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn health_check_reports_service_details() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "enlist");
    assert_eq!(body["project_id"], "test-project");
    assert_eq!(body["store_reachable"], true);
    assert_eq!(body["mail_configured"], false);
}
