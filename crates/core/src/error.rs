//! Unified error types for the SMS relay.
//!
//! Error codes:
//! - VALID_001-005: Upload validation errors
//! - STORE_001: Storage errors
//! - CONFIG_001: Configuration errors
//! - INTERNAL_001: Everything else

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Body is not valid JSON / form data, or holds no records
    InvalidFormat,
    /// VALID_002: One of sender, message, timestamp, type is missing
    MissingField,
    /// VALID_003: Timestamp is not epoch milliseconds of a valid instant
    InvalidTimestamp,
    /// VALID_004: A field exceeds its length limit
    FieldTooLong,
    /// VALID_005: Payload or batch exceeds the request limits
    PayloadTooLarge,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "VALID_001",
            Self::MissingField => "VALID_002",
            Self::InvalidTimestamp => "VALID_003",
            Self::FieldTooLong => "VALID_004",
            Self::PayloadTooLarge => "VALID_005",
        }
    }

    /// Get the HTTP status code. Every validation failure is a 400.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Unified error type for the SMS relay.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with code.
    pub fn validation_code(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationWithCode { http_status, .. } => *http_status,
            Self::Serialization(_) => 400,
            Self::Storage(_) | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get the stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationWithCode { code, .. } => code,
            Self::Serialization(_) => ValidationErrorCode::InvalidFormat.code(),
            Self::Storage(_) => "STORE_001",
            Self::Config(_) => "CONFIG_001",
            Self::Internal(_) => "INTERNAL_001",
        }
    }

    /// Human readable message without the code prefix.
    pub fn message(&self) -> String {
        match self {
            Self::ValidationWithCode { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
