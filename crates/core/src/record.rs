//! Accepted SMS record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display format used by the dashboard, export, and mail digest.
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One validated SMS message.
///
/// Only built through [`crate::SmsUpload::into_record`], so every instance
/// has non-empty fields and a timestamp that maps to a valid instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub sender: String,
    pub body: String,
    /// Milliseconds since epoch, as reported by the phone.
    pub timestamp_millis: i64,
    /// "sent", "received", ...
    #[serde(rename = "type")]
    pub kind: String,
    pub received_at: DateTime<Utc>,
}

impl Record {
    /// The phone-side timestamp as a UTC instant.
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp_millis).unwrap_or(self.received_at)
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub fn formatted_date(&self) -> String {
        self.timestamp().format(DISPLAY_DATE_FORMAT).to_string()
    }
}
