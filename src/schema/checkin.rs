//! Check-in record validation rules
//!
//! The engine itself never rejects a record (it clamps). These rules are for
//! callers that want to refuse bad input before it is stored.

use crate::types::{CheckinRecord, Metric, RATING_MAX, RATING_MIN};
use thiserror::Error;

/// Identifier of the check-in input schema
pub const SCHEMA_VERSION: &str = "mood.checkin.v1";

/// Maximum number of tags per check-in
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag, in characters
pub const MAX_TAG_LENGTH: usize = 50;

/// Maximum length of the notes field, in characters
pub const MAX_NOTES_LENGTH: usize = 2000;

/// Validation errors for check-in records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{metric} must be between 1 and 10, got {value}")]
    RatingOutOfRange { metric: &'static str, value: f64 },

    #[error("Too many tags: {count} (maximum {MAX_TAGS})")]
    TooManyTags { count: usize },

    #[error("Tag cannot be blank")]
    BlankTag,

    #[error("Tag '{tag}' exceeds {MAX_TAG_LENGTH} characters")]
    TagTooLong { tag: String },

    #[error("Notes exceed {MAX_NOTES_LENGTH} characters ({length})")]
    NotesTooLong { length: usize },
}

impl CheckinRecord {
    /// Validate the record against the input rules, reporting the first violation
    pub fn validate(&self) -> Result<(), ValidationError> {
        for metric in Metric::ALL {
            if let Some(value) = self.metric(metric) {
                if !(RATING_MIN..=RATING_MAX).contains(&value) {
                    return Err(ValidationError::RatingOutOfRange {
                        metric: metric.as_str(),
                        value,
                    });
                }
            }
        }

        if self.tags.len() > MAX_TAGS {
            return Err(ValidationError::TooManyTags {
                count: self.tags.len(),
            });
        }
        for tag in &self.tags {
            if tag.trim().is_empty() {
                return Err(ValidationError::BlankTag);
            }
            if tag.chars().count() > MAX_TAG_LENGTH {
                return Err(ValidationError::TagTooLong { tag: tag.clone() });
            }
        }

        if let Some(notes) = &self.notes {
            let length = notes.chars().count();
            if length > MAX_NOTES_LENGTH {
                return Err(ValidationError::NotesTooLong { length });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(mood: f64) -> CheckinRecord {
        CheckinRecord::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(), mood)
    }

    #[test]
    fn test_valid_record() {
        let mut r = record(7.0);
        r.stress = Some(1.0);
        r.tags.insert("exercise".to_string());
        r.notes = Some("Went for a run".to_string());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut r = record(7.0);
        r.energy = Some(11.0);
        assert_eq!(
            r.validate(),
            Err(ValidationError::RatingOutOfRange {
                metric: "energy",
                value: 11.0
            })
        );
        assert!(record(0.5).validate().is_err());
        assert!(record(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_tag_rules() {
        let mut r = record(5.0);
        r.tags = (0..21).map(|i| format!("tag{i}")).collect();
        assert_eq!(r.validate(), Err(ValidationError::TooManyTags { count: 21 }));

        let mut r = record(5.0);
        r.tags.insert("   ".to_string());
        assert_eq!(r.validate(), Err(ValidationError::BlankTag));

        let mut r = record(5.0);
        r.tags.insert("x".repeat(51));
        assert!(matches!(r.validate(), Err(ValidationError::TagTooLong { .. })));
    }

    #[test]
    fn test_notes_too_long() {
        let mut r = record(5.0);
        r.notes = Some("a".repeat(2001));
        assert_eq!(
            r.validate(),
            Err(ValidationError::NotesTooLong { length: 2001 })
        );
    }
}
