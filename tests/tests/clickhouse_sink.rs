//! ClickHouse sink against a real server.
//!
//! Tests that need a live server require Docker (or
//! `SMS_RELAY_TEST_CLICKHOUSE_URL`) and are ignored by default.

use chrono::Utc;
use clickhouse_client::{count_records, fetch_recent, truncate_records, ClickHouseConfig, ClickHouseSink};
use integration_tests::containers::TestContainers;
use relay_core::{Record, RecordSink};

fn record(body: &str, timestamp_millis: i64) -> Record {
    Record {
        id: uuid::Uuid::new_v4(),
        sender: "+15550100".into(),
        body: body.into(),
        timestamp_millis,
        kind: "received".into(),
        received_at: Utc::now(),
    }
}

async fn sink(containers: &TestContainers) -> ClickHouseSink {
    let sink = ClickHouseSink::new(ClickHouseConfig {
        url: containers.clickhouse_url.clone(),
        database: containers.clickhouse_database.clone(),
        username: containers.clickhouse_username.clone(),
        password: containers.clickhouse_password.clone(),
    })
    .expect("Failed to create ClickHouse sink");

    sink.init_schema().await.expect("Failed to initialize schema");
    truncate_records(sink.client()).await.expect("Failed to truncate");
    sink
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_flushed_batch_lands_in_table() {
    let containers = TestContainers::start().await;
    let sink = sink(&containers).await;

    assert!(sink.health_check().await);

    sink.send(&[
        record("first", 1_709_296_245_000),
        record("second", 1_709_296_246_000),
    ])
    .await
    .expect("Insert failed");

    let count = count_records(sink.client()).await.expect("Count query failed");
    assert_eq!(count, 2);

    let rows = fetch_recent(sink.client(), 10).await.expect("Query failed");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].message, "second");
    assert_eq!(rows[0].timestamp, 1_709_296_246_000);
    assert_eq!(rows[1].kind, "received");
}

/// Nothing listens on port 9, so this runs without Docker.
#[tokio::test]
async fn test_unreachable_server_is_storage_error() {
    let sink = ClickHouseSink::new(ClickHouseConfig {
        url: "http://127.0.0.1:9".into(),
        ..ClickHouseConfig::default()
    })
    .unwrap();

    assert!(!sink.health_check().await);
    let err = sink.send(&[record("x", 0)]).await.unwrap_err();
    assert!(matches!(err, relay_core::SendError::Storage(_)));
}
