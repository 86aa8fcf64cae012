//! `RecordSink` backed by the `sms_messages` table.

use async_trait::async_trait;
use relay_core::{Record, RecordSink, SendError};

use crate::client::ClickHouseClient;
use crate::config::ClickHouseConfig;
use crate::{health, insert};

#[derive(Clone)]
pub struct ClickHouseSink {
    client: ClickHouseClient,
}

impl ClickHouseSink {
    pub fn new(config: ClickHouseConfig) -> relay_core::Result<Self> {
        Ok(Self {
            client: ClickHouseClient::new(config)?,
        })
    }

    pub fn client(&self) -> &ClickHouseClient {
        &self.client
    }

    /// Create the table if missing.
    pub async fn init_schema(&self) -> relay_core::Result<()> {
        health::init_schema(&self.client).await
    }
}

#[async_trait]
impl RecordSink for ClickHouseSink {
    async fn send(&self, records: &[Record]) -> Result<(), SendError> {
        insert::insert_records(&self.client, records)
            .await
            .map(|_| ())
            .map_err(|e| SendError::storage(e.message()))
    }

    fn name(&self) -> &'static str {
        "clickhouse"
    }

    async fn health_check(&self) -> bool {
        health::check_connection(&self.client).await
    }
}
