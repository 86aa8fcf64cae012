//! Common test setup functions.

use api::{router, state::AppState};
use axum::Router;
use outbox::{BufferConfig, IngestBuffer, RecordArchive};
use relay_core::{Record, RecordSink};
use std::sync::Arc;
use std::time::Duration;

use crate::mocks::MockSink;

/// Test context wired like production, with a mock sink.
///
/// - Real Axum router with all layers
/// - Real `IngestBuffer` and in-memory `RecordArchive`
/// - `MockSink` capturing every flushed batch
pub struct TestContext {
    pub buffer: Arc<IngestBuffer>,
    pub archive: Arc<RecordArchive>,
    pub mock_sink: Arc<MockSink>,
    pub router: Router,
}

impl TestContext {
    /// Batch size 50 and an idle window long enough that it never fires
    /// during a test.
    pub fn new() -> Self {
        Self::with_buffer(50, Duration::from_secs(3600))
    }

    pub fn with_buffer(batch_size: usize, idle_window: Duration) -> Self {
        let mock_sink = Arc::new(MockSink::new());
        let buffer = IngestBuffer::new(
            BufferConfig {
                batch_size,
                idle_window,
            },
            mock_sink.clone() as Arc<dyn RecordSink>,
        );
        let archive = Arc::new(RecordArchive::in_memory());

        let state = AppState::new(buffer.clone(), archive.clone());
        let router = router(state);

        Self {
            buffer,
            archive,
            mock_sink,
            router,
        }
    }

    /// Records delivered to the sink so far.
    pub fn delivered(&self) -> Vec<Record> {
        self.mock_sink.captured_records()
    }

    pub fn delivered_bodies(&self) -> Vec<String> {
        self.delivered().into_iter().map(|r| r.body).collect()
    }

    pub fn buffered_bodies(&self) -> Vec<String> {
        self.buffer.snapshot().into_iter().map(|r| r.body).collect()
    }

    /// Set the mock sink to fail (for requeue testing).
    pub fn set_sink_failure(&self, should_fail: bool) {
        self.mock_sink.set_should_fail(should_fail);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
