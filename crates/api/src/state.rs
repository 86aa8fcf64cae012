//! Application state shared across handlers.

use outbox::{IngestBuffer, RecordArchive};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Pending records on their way to the sink
    pub buffer: Arc<IngestBuffer>,
    /// Every accepted record, for the dashboard and export
    pub archive: Arc<RecordArchive>,
}

impl AppState {
    pub fn new(buffer: Arc<IngestBuffer>, archive: Arc<RecordArchive>) -> Self {
        Self { buffer, archive }
    }
}
