//! Core types, upload parsing, and validation for the SMS relay.

pub mod error;
pub mod limits;
pub mod record;
pub mod sink;
pub mod upload;

pub use error::{Error, Result, ValidationErrorCode};
pub use record::*;
pub use sink::*;
pub use upload::*;
