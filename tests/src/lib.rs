//! Shared helpers for the SMS relay integration tests.

pub mod containers;
pub mod mocks;
pub mod setup;
