//! Size limits for SMS uploads.
//!
//! Field limits match the `sms_messages` table shape (`VARCHAR(255)` sender,
//! `VARCHAR(50)` type). The `#[validate]` derive needs literals, so
//! `upload.rs` repeats these values. Keep both in sync.

/// Maximum upload body size in bytes (1MB).
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Maximum records in one upload request.
pub const MAX_RECORDS_PER_UPLOAD: usize = 500;

/// Sender address / phone number max length.
pub const MAX_SENDER_LEN: u64 = 255;

/// Message body max length (16KB). Concatenated SMS rarely exceed 2KB.
pub const MAX_BODY_LEN: u64 = 16 * 1024;

/// Message type max length ("sent", "received", "draft", ...).
pub const MAX_KIND_LEN: u64 = 50;
