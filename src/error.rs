//! Caller-facing errors. Provider failures never surface here; they become
//! empty series inside the fetchers.

use thiserror::Error;

/// Misuse by the caller (presentation layer), reported as a user message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start year {start} must be before end year {end}")]
    InvalidRange { start: i32, end: i32 },
    #[error("select at least one {0}")]
    EmptySelection(&'static str),
    #[error("unknown country: {0}")]
    UnknownCountry(String),
    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),
}
