//! Report encoding
//!
//! Wraps an `AnalyticsResult` in a versioned envelope for the presentation
//! layer. The envelope carries no timestamps or random identifiers, so the
//! same result always encodes to the same bytes.

use crate::error::AnalyticsError;
use crate::types::AnalyticsResult;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use serde::{Deserialize, Serialize};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata embedded in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
}

/// Versioned analytics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub result: AnalyticsResult,
}

/// Encoder for analytics reports
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEncoder {
    pretty: bool,
}

impl AnalyticsEncoder {
    /// Create an encoder producing compact JSON
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create an encoder producing indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Wrap a result in a report envelope
    pub fn encode(&self, result: &AnalyticsResult) -> AnalyticsReport {
        AnalyticsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
            },
            result: result.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, result: &AnalyticsResult) -> Result<String, AnalyticsError> {
        let report = self.encode(result);
        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        json.map_err(AnalyticsError::JsonError)
    }
}
