//! Sink that only logs. Useful locally when no relay or database is around.

use async_trait::async_trait;
use relay_core::{Record, RecordSink, SendError};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl RecordSink for LogSink {
    async fn send(&self, records: &[Record]) -> Result<(), SendError> {
        for record in records {
            info!(
                id = %record.id,
                sender = %record.sender,
                kind = %record.kind,
                date = %record.formatted_date(),
                body = %record.body,
                "SMS"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
