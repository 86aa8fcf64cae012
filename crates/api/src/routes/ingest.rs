//! Upload endpoint handler.
//!
//! Accepts SMS uploads as JSON (single object, array, or
//! `{ "messages": [...] }`) or as a form-encoded single message. Every
//! message is validated before anything is stored; one bad message rejects
//! the whole request.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use chrono::Utc;
use outbox::FlushOutcome;
use relay_core::{Record, UploadPayload};
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tracing::{debug, error, info, warn};

use crate::response::{ApiError, UploadResponse};
use crate::state::AppState;

/// POST /upload-sms (alias /sms_upload)
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let start = Instant::now();
    metrics().upload_requests.inc();

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    debug!(
        content_type = ?content_type,
        payload_size = body.len(),
        "Received SMS upload"
    );

    let payload = UploadPayload::parse(content_type, &body).map_err(|e| {
        warn!(error = %e, "Rejected unparseable upload");
        metrics().records_rejected.inc();
        ApiError::from(e)
    })?;

    let submitted = payload.uploads.len();
    let records = payload.into_records(Utc::now()).map_err(|e| {
        warn!(submitted = submitted, error = %e, "Rejected invalid upload");
        metrics().records_rejected.inc_by(submitted as u64);
        ApiError::from(e)
    })?;

    let accepted = records.len();
    let outcomes = store(&state, records).await?;
    metrics().records_accepted.inc_by(accepted as u64);
    if !outcomes.is_empty() {
        debug!(outcomes = ?outcomes, "Upload triggered threshold flush");
    }

    let buffered = state.buffer.len();
    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().ingest_latency_ms.observe(latency_ms);

    info!(
        accepted = accepted,
        buffered = buffered,
        latency_ms = latency_ms,
        "Upload processed"
    );

    Ok(Json(UploadResponse::success(accepted, buffered)))
}

/// Archive and buffer an accepted upload on its own task. A client that
/// disconnects mid-request drops the handler future, but not this work.
async fn store(state: &AppState, records: Vec<Record>) -> Result<Vec<FlushOutcome>, ApiError> {
    let archive = Arc::clone(&state.archive);
    let buffer = Arc::clone(&state.buffer);

    tokio::spawn(async move {
        archive.extend(&records).await;
        buffer.append_many(records).await
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Upload storage task failed");
        ApiError::from(relay_core::Error::internal(format!(
            "Failed to store upload: {}",
            e
        )))
    })
}
