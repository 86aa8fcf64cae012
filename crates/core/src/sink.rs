//! Downstream sink contract.
//!
//! The ingest buffer hands every flushed batch to one `RecordSink`. The mail
//! relay, ClickHouse, and log sinks implement it in production; tests plug
//! in an in-memory mock.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

/// Why a downstream send failed. Never surfaced to HTTP callers: the buffer
/// logs it and requeues the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    /// Sink is misconfigured (e.g. no destination address). Records keep
    /// accumulating until the configuration is fixed.
    #[error("sink misconfigured: {0}")]
    Config(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("sink rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl SendError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Receives flushed batches in buffer order.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Deliver one batch. The slice is never empty.
    async fn send(&self, records: &[Record]) -> Result<(), SendError>;

    /// Short name for logs and status output.
    fn name(&self) -> &'static str;

    /// Probe the sink at startup.
    async fn health_check(&self) -> bool {
        true
    }
}
