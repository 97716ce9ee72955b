//! Mood Analytics - Deterministic analytics engine for daily mood check-ins
//!
//! Turns a user's check-in history into descriptive analytics and rule-based
//! insights through a deterministic pipeline: normalization → trend, variance,
//! correlation, weekly pattern, streak and summary analysis → insight rules.
//!
//! ## Modules
//!
//! - **Pipeline**: `compute_analytics`, `AnalyticsEngine`, and the memoizing `AnalyticsProcessor`
//! - **Schema**: Parse check-in histories (JSON / NDJSON) and validate records
//! - **Encoder**: Versioned JSON reports for presentation layers

pub mod config;
pub mod correlation;
pub mod encoder;
pub mod error;
pub mod insights;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod streak;
pub mod summary;
pub mod trend;
pub mod types;
pub mod variance;
pub mod weekly;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::AnalyticsConfig;
pub use encoder::{AnalyticsEncoder, AnalyticsReport};
pub use error::AnalyticsError;
pub use pipeline::{analytics_to_json, compute_analytics, AnalyticsEngine, AnalyticsProcessor};
pub use types::{AnalyticsRequest, AnalyticsResult, CheckinRecord, PeriodLabel};

// Schema exports
pub use schema::{CheckinParser, ValidationError, SCHEMA_VERSION};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "mood-analytics";
