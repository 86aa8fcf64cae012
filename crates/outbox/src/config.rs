//! Buffer and sink configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::buffer::BufferConfig;

/// Which downstream sink receives flushed batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Email digest through an HTTP mail relay
    Mail,
    /// Rows in the ClickHouse `sms_messages` table
    ClickHouse,
    /// Log lines only (development)
    Log,
}

impl std::str::FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mail" | "email" => Ok(Self::Mail),
            "clickhouse" | "table" => Ok(Self::ClickHouse),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown sink '{}' (expected mail, clickhouse, or log)", other)),
        }
    }
}

/// Flush policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Flush as soon as this many records are buffered
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Flush after this many seconds without a new record
    #[serde(default = "default_idle_window_secs")]
    pub idle_window_secs: u64,
    #[serde(default = "default_sink")]
    pub sink: SinkKind,
    /// Optional JSON-lines file mirroring every accepted record
    #[serde(default)]
    pub archive_path: Option<String>,
}

fn default_batch_size() -> usize {
    50
}

fn default_idle_window_secs() -> u64 {
    30
}

fn default_sink() -> SinkKind {
    SinkKind::Mail
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            idle_window_secs: default_idle_window_secs(),
            sink: default_sink(),
            archive_path: None,
        }
    }
}

impl OutboxConfig {
    /// Reject settings that would make the flush policy meaningless.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if self.idle_window_secs == 0 {
            return Err("idle_window_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig {
            batch_size: self.batch_size,
            idle_window: Duration::from_secs(self.idle_window_secs),
        }
    }
}

/// HTTP mail relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Endpoint accepting `{from, to, subject, text}` JSON
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Bearer token for the relay (optional)
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_from")]
    pub from: String,
    /// Destination address. Flushes fail with a config error until set.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_relay_url() -> String {
    "http://localhost:8025/api/send".to_string()
}

fn default_from() -> String {
    "sms-relay@localhost".to_string()
}

fn default_subject_prefix() -> String {
    "[sms-relay]".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            api_key: None,
            from: default_from(),
            to: None,
            subject_prefix: default_subject_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
