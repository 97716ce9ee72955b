//! Parsing check-in histories from JSON and NDJSON

use crate::error::AnalyticsError;
use crate::schema::checkin::ValidationError;
use crate::types::CheckinRecord;
use serde::Serialize;
use uuid::Uuid;

/// Parser for check-in history input
pub struct CheckinParser;

impl CheckinParser {
    /// Parse a JSON string containing an array of check-ins
    pub fn parse_array(json: &str) -> Result<Vec<CheckinRecord>, AnalyticsError> {
        let records: Vec<CheckinRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON), one check-in per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<CheckinRecord>, AnalyticsError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<CheckinRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(AnalyticsError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[CheckinRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index: idx,
                    record_id: record.id,
                    error,
                })
            })
            .collect()
    }
}

/// A record that failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    #[serde(serialize_with = "serialize_error")]
    pub error: ValidationError,
}

fn serialize_error<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}
