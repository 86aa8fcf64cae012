//! Ingest buffer with batch-size and idle-window flushing, plus the mail
//! relay and log sinks and the record archive.

pub mod archive;
pub mod buffer;
pub mod config;
pub mod log_sink;
pub mod mail;

pub use archive::RecordArchive;
pub use buffer::{BufferConfig, FlushOutcome, IngestBuffer};
pub use config::*;
pub use log_sink::LogSink;
pub use mail::MailRelaySink;
