//! Error types for mood analytics

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can abort an analytics computation.
///
/// Analyzer-level "not enough data" conditions are never errors; they surface
/// as absent or flagged fields of the result.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Date range of {days} days exceeds the limit of {limit} days")]
    RangeTooLarge { days: i64, limit: i64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse check-in history: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid TOML configuration: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
