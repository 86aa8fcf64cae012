//! Tests for health check endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();

    let status = body["status"].as_str().expect("status field");
    assert!(
        status == "healthy" || status == "degraded",
        "Unexpected status: {}",
        status
    );
    assert_eq!(body["sink"], "mock");
    assert!(body["sink_healthy"].is_boolean());
    assert_eq!(body["buffered"], 0);
    assert!(body["report"]["components"].is_array());
}

/// Readiness does not depend on the sink: uploads buffer while it is down.
#[tokio::test]
async fn test_ready_while_sink_failing() {
    let ctx = TestContext::new();
    ctx.set_sink_failure(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health/live").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/nonexistent").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
