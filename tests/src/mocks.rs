//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_core::{Record, RecordSink, SendError};
use std::sync::Arc;

/// Mock sink that captures flushed batches in memory.
///
/// Implements the same `RecordSink` trait as the mail and ClickHouse sinks,
/// so router tests exercise the real buffer without any network.
#[derive(Clone)]
pub struct MockSink {
    /// Every batch delivered, in flush order.
    batches: Arc<Mutex<Vec<Vec<Record>>>>,
    /// Simulate failures if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn captured_batches(&self) -> Vec<Vec<Record>> {
        self.batches.lock().clone()
    }

    /// All delivered records, flattened in delivery order.
    pub fn captured_records(&self) -> Vec<Record> {
        self.batches.lock().iter().flatten().cloned().collect()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn clear(&self) {
        self.batches.lock().clear();
    }

    /// Set failure mode for testing requeue behaviour.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSink for MockSink {
    async fn send(&self, records: &[Record]) -> Result<(), SendError> {
        if *self.should_fail.lock() {
            return Err(SendError::transport("Mock sink failure"));
        }

        self.batches.lock().push(records.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> bool {
        !*self.should_fail.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(body: &str) -> Record {
        Record {
            id: uuid::Uuid::new_v4(),
            sender: "+15550100".into(),
            body: body.into(),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            kind: "received".into(),
            received_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_sink_captures_batches() {
        let mock = MockSink::new();

        mock.send(&[test_record("r1")]).await.unwrap();

        assert_eq!(mock.batch_count(), 1);
        assert_eq!(mock.captured_records()[0].body, "r1");
    }

    #[tokio::test]
    async fn test_mock_sink_failure_mode() {
        let mock = MockSink::new();
        mock.set_should_fail(true);

        let result = mock.send(&[test_record("r1")]).await;
        assert!(result.is_err());
        assert!(!mock.health_check().await);
        assert_eq!(mock.batch_count(), 0);
    }
}
