//! ClickHouse table schema.
//!
//! Tables are created unqualified so they land in the client's database.

/// Flushed SMS records, one row per message.
pub const CREATE_SMS_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sms_messages (
    id String,
    sender String,
    message String,
    timestamp DateTime64(3),
    type LowCardinality(String),
    received_at DateTime64(3)
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (timestamp, sender, id)
"#;

pub fn all_tables() -> Vec<&'static str> {
    vec![CREATE_SMS_MESSAGES_TABLE]
}
