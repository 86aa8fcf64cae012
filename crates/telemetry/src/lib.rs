//! Telemetry for the SMS relay: structured logging setup, in-process
//! metrics, and the health registry behind `/health`.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
