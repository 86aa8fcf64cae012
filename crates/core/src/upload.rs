//! Upload payload parsing and validation.
//!
//! The phone client posts `sender`, `message`, `timestamp`, `type`. Bodies
//! may be JSON (single object, array, or `{ "messages": [...] }`) or
//! `application/x-www-form-urlencoded` carrying one message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::{MAX_PAYLOAD_BYTES, MAX_RECORDS_PER_UPLOAD};
use crate::record::Record;

const MISSING_FIELDS_MESSAGE: &str = "Missing data. Required: sender, message, timestamp, type";
const INVALID_TIMESTAMP_MESSAGE: &str = "Invalid timestamp format";

/// One message as posted by the phone, before validation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SmsUpload {
    #[serde(default, deserialize_with = "lenient_string")]
    #[validate(length(max = 255))]
    pub sender: Option<String>,

    #[serde(default, alias = "body", deserialize_with = "lenient_string")]
    #[validate(length(max = 16384))]
    pub message: Option<String>,

    /// Epoch milliseconds, as a JSON number or a decimal string.
    #[serde(default, alias = "timestampMillis")]
    pub timestamp: Option<Value>,

    #[serde(default, rename = "type", alias = "kind", deserialize_with = "lenient_string")]
    #[validate(length(max = 50))]
    pub kind: Option<String>,
}

/// Accepts strings, numbers, and booleans; phones sometimes send the sender
/// as a bare number.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl SmsUpload {
    /// Validate and convert into a [`Record`] stamped with `received_at`.
    pub fn into_record(self, received_at: DateTime<Utc>) -> Result<Record> {
        let all_present = present(&self.sender).is_some()
            && present(&self.message).is_some()
            && present(&self.kind).is_some()
            && !timestamp_missing(self.timestamp.as_ref());

        if !all_present {
            return Err(Error::validation_code(
                ValidationErrorCode::MissingField,
                MISSING_FIELDS_MESSAGE,
            ));
        }

        self.validate().map_err(|errors| {
            let fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect();
            Error::validation_code(
                ValidationErrorCode::FieldTooLong,
                format!("Field too long: {}", fields.join(", ")),
            )
        })?;

        let timestamp_millis = self
            .timestamp
            .as_ref()
            .and_then(parse_timestamp_millis)
            .ok_or_else(|| {
                Error::validation_code(
                    ValidationErrorCode::InvalidTimestamp,
                    INVALID_TIMESTAMP_MESSAGE,
                )
            })?;

        Ok(Record {
            id: Uuid::new_v4(),
            sender: self.sender.unwrap_or_default(),
            body: self.message.unwrap_or_default(),
            timestamp_millis,
            kind: self.kind.unwrap_or_default(),
            received_at,
        })
    }
}

fn timestamp_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Parse epoch milliseconds and confirm they map to a representable instant.
pub fn parse_timestamp_millis(value: &Value) -> Option<i64> {
    let millis = match value {
        Value::Number(n) => match n.as_i64() {
            Some(ms) => ms,
            None => {
                let ms = n.as_f64()?;
                if !ms.is_finite() || ms.abs() > i64::MAX as f64 {
                    return None;
                }
                ms.trunc() as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    DateTime::<Utc>::from_timestamp_millis(millis).map(|_| millis)
}

/// Parsed upload body.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub uploads: Vec<SmsUpload>,
}

impl UploadPayload {
    /// Parse an upload body, choosing the decoder from the content type.
    ///
    /// Supports:
    /// 1. Form: `sender=...&message=...&timestamp=...&type=...`
    /// 2. Array: `[sms, sms, ...]`
    /// 3. Object with messages: `{ "messages": [...] }`
    /// 4. Single message: `{ "sender": "...", ... }`
    pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_PAYLOAD_BYTES {
            return Err(Error::validation_code(
                ValidationErrorCode::PayloadTooLarge,
                format!(
                    "Payload size {}KB exceeds {}KB limit",
                    bytes.len() / 1024,
                    MAX_PAYLOAD_BYTES / 1024
                ),
            ));
        }

        let is_form = content_type
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let uploads = if is_form {
            vec![Self::parse_form(bytes)]
        } else {
            Self::parse_json(bytes)?
        };

        if uploads.is_empty() {
            return Err(Error::validation_code(
                ValidationErrorCode::InvalidFormat,
                "Upload contains no messages",
            ));
        }

        if uploads.len() > MAX_RECORDS_PER_UPLOAD {
            return Err(Error::validation_code(
                ValidationErrorCode::PayloadTooLarge,
                format!(
                    "Upload has {} messages, exceeds {} limit",
                    uploads.len(),
                    MAX_RECORDS_PER_UPLOAD
                ),
            ));
        }

        Ok(Self { uploads })
    }

    fn parse_form(bytes: &[u8]) -> SmsUpload {
        let mut upload = SmsUpload::default();
        for (key, value) in url::form_urlencoded::parse(bytes) {
            let value = value.into_owned();
            match key.as_ref() {
                "sender" => upload.sender = Some(value),
                "message" | "body" => upload.message = Some(value),
                "timestamp" | "timestampMillis" => upload.timestamp = Some(Value::String(value)),
                "type" | "kind" => upload.kind = Some(value),
                _ => {}
            }
        }
        upload
    }

    fn parse_json(bytes: &[u8]) -> Result<Vec<SmsUpload>> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            Error::validation_code(
                ValidationErrorCode::InvalidFormat,
                format!("invalid JSON: {}", e),
            )
        })?;

        let invalid = |what: &str, e: serde_json::Error| {
            Error::validation_code(
                ValidationErrorCode::InvalidFormat,
                format!("invalid {}: {}", what, e),
            )
        };

        let is_wrapper = value
            .as_object()
            .map(|obj| obj.contains_key("messages"))
            .unwrap_or(false);

        if value.is_array() {
            serde_json::from_value(value).map_err(|e| invalid("message array", e))
        } else if is_wrapper {
            #[derive(Deserialize)]
            struct Wrapper {
                messages: Vec<SmsUpload>,
            }
            let wrapper: Wrapper =
                serde_json::from_value(value).map_err(|e| invalid("batch object", e))?;
            Ok(wrapper.messages)
        } else if value.is_object() {
            let upload: SmsUpload =
                serde_json::from_value(value).map_err(|e| invalid("message", e))?;
            Ok(vec![upload])
        } else {
            Err(Error::validation_code(
                ValidationErrorCode::InvalidFormat,
                "request body must be a message object or an array of messages",
            ))
        }
    }

    /// Validate every upload. Fails on the first invalid message so a batch
    /// is accepted whole or not at all.
    pub fn into_records(self, received_at: DateTime<Utc>) -> Result<Vec<Record>> {
        self.uploads
            .into_iter()
            .enumerate()
            .map(|(index, upload)| {
                upload.into_record(received_at).map_err(|e| match e {
                    Error::ValidationWithCode {
                        code,
                        message,
                        http_status,
                    } if index > 0 => Error::ValidationWithCode {
                        code,
                        message: format!("message {}: {}", index, message),
                        http_status,
                    },
                    other => other,
                })
            })
            .collect()
    }
}
