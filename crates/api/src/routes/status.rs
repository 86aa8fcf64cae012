//! Buffer and sink status.

use axum::{extract::State, Json};
use telemetry::{health, metrics};

use crate::response::StatusResponse;
use crate::state::AppState;

/// GET /api/status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.buffer.config();

    Json(StatusResponse {
        buffered: state.buffer.len(),
        pending_flush: state.buffer.has_pending_timer(),
        batch_size: config.batch_size,
        idle_window_secs: config.idle_window.as_secs(),
        sink: state.buffer.sink_name().to_string(),
        sink_healthy: health().sink.is_healthy(),
        archived: state.archive.len(),
        metrics: metrics().snapshot(),
    })
}
