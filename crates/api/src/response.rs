//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use relay_core::Record;
use serde::{Deserialize, Serialize};
use telemetry::{HealthReport, MetricsSnapshot};
use uuid::Uuid;

/// Success response for uploads.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    /// Records accepted from this request
    pub accepted: usize,
    /// Records waiting in the buffer after this request
    pub buffered: usize,
}

impl UploadResponse {
    pub fn success(accepted: usize, buffered: usize) -> Self {
        let message = if accepted == 1 {
            "SMS received".to_string()
        } else {
            format!("{} SMS received", accepted)
        };

        Self {
            status: "success".to_string(),
            message,
            accepted,
            buffered,
        }
    }
}

/// Export view of an archived record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: Uuid,
    pub sender: String,
    pub body: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
    pub formatted_date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub received_at: DateTime<Utc>,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            sender: record.sender.clone(),
            body: record.body.clone(),
            timestamp: record.timestamp_millis,
            formatted_date: record.formatted_date(),
            kind: record.kind.clone(),
            received_at: record.received_at,
        }
    }
}

/// `GET /api/status` body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub buffered: usize,
    pub pending_flush: bool,
    pub batch_size: usize,
    pub idle_window_secs: u64,
    pub sink: String,
    pub sink_healthy: bool,
    pub archived: usize,
    pub metrics: MetricsSnapshot,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sink: String,
    pub sink_healthy: bool,
    pub buffered: usize,
    pub report: HealthReport,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type carrying a stable error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(code, msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<relay_core::Error> for ApiError {
    fn from(err: relay_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = err.message();

        let mut api_error = ApiError::with_code(status, err.error_code(), message.clone());
        if status.is_client_error() {
            api_error.response = api_error.response.with_details(vec![message]);
        }
        api_error
    }
}
