//! Tests for upload validation errors.
//!
//! A rejected upload must leave both the archive and the buffer untouched.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

fn assert_nothing_accepted(ctx: &TestContext) {
    assert!(ctx.archive.is_empty(), "Archive should be empty");
    assert!(ctx.buffer.is_empty(), "Buffer should be empty");
}

#[tokio::test]
async fn test_missing_field_returns_valid_002() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.post("/upload-sms").json(&fixtures::missing_sender()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALID_002");
    assert_eq!(
        body["message"],
        "Missing data. Required: sender, message, timestamp, type"
    );
    assert_nothing_accepted(&ctx);
}

#[tokio::test]
async fn test_bad_timestamp_returns_valid_003() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.post("/upload-sms").json(&fixtures::bad_timestamp()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_003");
    assert_eq!(body["message"], "Invalid timestamp format");
    assert_nothing_accepted(&ctx);
}

#[tokio::test]
async fn test_invalid_json_returns_valid_001() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/upload-sms")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
    assert_nothing_accepted(&ctx);
}

#[tokio::test]
async fn test_empty_array_returns_valid_001() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/upload-sms")
        .content_type("application/json")
        .bytes("[]".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_one_bad_record_rejects_whole_batch() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let mut uploads = fixtures::sms_batch(3);
    uploads.push(fixtures::bad_timestamp());

    let response = server
        .post("/upload-sms")
        .content_type("application/json")
        .bytes(fixtures::array_payload(uploads).into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_003");
    assert_eq!(body["message"], "message 3: Invalid timestamp format");
    assert_nothing_accepted(&ctx);
}

#[tokio::test]
async fn test_oversized_message_returns_valid_004() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/upload-sms")
        .json(&fixtures::oversized_message())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_004");
    assert_nothing_accepted(&ctx);
}

#[tokio::test]
async fn test_oversized_batch_returns_400() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/upload-sms")
        .content_type("application/json")
        .bytes(fixtures::array_payload(fixtures::oversized_batch()).into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_005");
    assert_nothing_accepted(&ctx);
}

#[tokio::test]
async fn test_form_upload_missing_timestamp() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/upload-sms")
        .content_type("application/x-www-form-urlencoded")
        .bytes("sender=%2B15550100&message=hi&type=received".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_002");
    assert_nothing_accepted(&ctx);
}
