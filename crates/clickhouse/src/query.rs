//! Read-back queries (used in tests and admin).

use crate::client::ClickHouseClient;
use crate::insert::SMS_TABLE;
use clickhouse::Row;
use relay_core::{Error, Result};
use serde::Deserialize;

/// Row shape returned by [`fetch_recent`].
#[derive(Debug, Clone, Row, Deserialize)]
pub struct StoredSms {
    pub id: String,
    pub sender: String,
    pub message: String,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

pub async fn count_records(client: &ClickHouseClient) -> Result<u64> {
    let count: u64 = client
        .inner()
        .query(&format!("SELECT count() FROM {}", SMS_TABLE))
        .fetch_one()
        .await
        .map_err(|e| Error::storage(format!("Query error: {}", e)))?;
    Ok(count)
}

/// Most recent messages by phone timestamp.
pub async fn fetch_recent(client: &ClickHouseClient, limit: u32) -> Result<Vec<StoredSms>> {
    let rows: Vec<StoredSms> = client
        .inner()
        .query(&format!(
            "SELECT id, sender, message, toUnixTimestamp64Milli(timestamp) AS timestamp, type \
             FROM {} ORDER BY timestamp DESC LIMIT ?",
            SMS_TABLE
        ))
        .bind(limit)
        .fetch_all()
        .await
        .map_err(|e| Error::storage(format!("Query error: {}", e)))?;
    Ok(rows)
}

/// Truncate the table (test cleanup).
pub async fn truncate_records(client: &ClickHouseClient) -> Result<()> {
    client
        .inner()
        .query(&format!("TRUNCATE TABLE IF EXISTS {}", SMS_TABLE))
        .execute()
        .await
        .map_err(|e| Error::storage(format!("Truncate error: {}", e)))?;
    Ok(())
}
