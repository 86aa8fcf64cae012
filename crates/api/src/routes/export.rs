//! JSON export of archived records.

use axum::{extract::State, Json};

use crate::response::RecordView;
use crate::state::AppState;

/// GET /api/sms - every accepted record, oldest first. No pagination.
pub async fn export_handler(State(state): State<AppState>) -> Json<Vec<RecordView>> {
    let records = state.archive.all();
    Json(records.iter().map(RecordView::from).collect())
}
