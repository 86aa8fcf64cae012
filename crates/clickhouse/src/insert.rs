//! Batch insert for SMS rows.

use crate::client::ClickHouseClient;
use clickhouse::Row;
use relay_core::{Error, Record, Result};
use serde::Serialize;
use tracing::debug;

pub const SMS_TABLE: &str = "sms_messages";

/// Flattened record for the `sms_messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Row, Serialize)]
pub struct SmsRow {
    pub id: String,
    pub sender: String,
    pub message: String,
    pub timestamp: i64, // DateTime64(3), milliseconds since epoch
    #[serde(rename = "type")]
    pub kind: String,
    pub received_at: i64,
}

impl From<&Record> for SmsRow {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.to_string(),
            sender: record.sender.clone(),
            message: record.body.clone(),
            timestamp: record.timestamp_millis,
            kind: record.kind.clone(),
            received_at: record.received_at.timestamp_millis(),
        }
    }
}

/// Insert one flushed batch. Either every row is written or an error is returned.
pub async fn insert_records(client: &ClickHouseClient, records: &[Record]) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let start = std::time::Instant::now();

    let mut insert = client
        .inner()
        .insert(SMS_TABLE)
        .map_err(|e| Error::storage(format!("Insert error: {}", e)))?;

    for record in records {
        insert
            .write(&SmsRow::from(record))
            .await
            .map_err(|e| Error::storage(format!("Write error: {}", e)))?;
    }

    insert
        .end()
        .await
        .map_err(|e| Error::storage(format!("End error: {}", e)))?;

    debug!(
        count = records.len(),
        latency_ms = %start.elapsed().as_millis(),
        "Inserted SMS rows to ClickHouse"
    );

    Ok(records.len())
}
