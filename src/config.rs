//! Engine configuration
//!
//! Every threshold the analyzers and insight rules use is a policy knob here
//! rather than a hardcoded constant. Configs load from TOML or JSON; any field
//! left out takes its default.

use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Policy knobs for a single analytics computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Points per trend window (recent and prior each)
    pub trend_window_size: usize,
    /// Synthesize a placeholder series when the history is empty
    pub placeholder_fallback_enabled: bool,
    /// Maximum number of insights emitted
    pub max_insights: usize,
    /// Mood variance below this flags a stable pattern
    pub stability_variance_threshold: f64,
    /// Paired observations required before a factor is reported
    pub correlation_min_observations: usize,
    /// Percent change beyond which a trend is improving/declining
    pub trend_threshold_percent: f64,
    /// Coefficient magnitude required for a correlation insight
    pub correlation_insight_threshold: f64,
    /// Mood values required in the variance window for a stability insight
    pub stability_min_points: usize,
    /// Current streak required for an encouragement insight
    pub streak_insight_min_days: u32,
    /// Tags turned into 0/1 factor series for correlation
    pub correlation_tags: Vec<String>,
    /// Upper bound on the length of a caller-supplied date range
    pub max_range_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trend_window_size: 7,
            placeholder_fallback_enabled: true,
            max_insights: 5,
            stability_variance_threshold: 1.0,
            correlation_min_observations: 3,
            trend_threshold_percent: 5.0,
            correlation_insight_threshold: 0.5,
            stability_min_points: 5,
            streak_insight_min_days: 3,
            correlation_tags: vec![
                "exercise".to_string(),
                "social".to_string(),
                "work".to_string(),
            ],
            max_range_days: 3660,
        }
    }
}

impl AnalyticsConfig {
    /// Load a config from TOML and validate it
    pub fn from_toml_str(toml_str: &str) -> Result<Self, AnalyticsError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to TOML
    pub fn to_toml_string(&self) -> Result<String, AnalyticsError> {
        toml::to_string_pretty(self).map_err(|e| AnalyticsError::EncodingError(e.to_string()))
    }

    /// Reject knob values that would make the analyzers meaningless
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.trend_window_size == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "trend_window_size must be at least 1".to_string(),
            ));
        }
        if self.max_insights == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "max_insights must be at least 1".to_string(),
            ));
        }
        if self.correlation_min_observations < 2 {
            return Err(AnalyticsError::InvalidConfig(
                "correlation_min_observations must be at least 2".to_string(),
            ));
        }
        if self.max_range_days <= 0 {
            return Err(AnalyticsError::InvalidConfig(
                "max_range_days must be positive".to_string(),
            ));
        }

        let thresholds = [
            ("stability_variance_threshold", self.stability_variance_threshold),
            ("trend_threshold_percent", self.trend_threshold_percent),
            ("correlation_insight_threshold", self.correlation_insight_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.trend_window_size, 7);
        assert!(config.placeholder_fallback_enabled);
        assert_eq!(config.max_insights, 5);
        assert_eq!(config.stability_variance_threshold, 1.0);
        assert_eq!(config.correlation_min_observations, 3);
        assert_eq!(config.trend_threshold_percent, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalyticsConfig::from_toml_str(
            r#"
            trend_window_size = 14
            correlation_tags = ["exercise", "meditation"]
            "#,
        )
        .unwrap();

        assert_eq!(config.trend_window_size, 14);
        assert_eq!(config.correlation_tags, vec!["exercise", "meditation"]);
        assert_eq!(config.max_insights, 5);
    }

    #[test]
    fn test_json_config() {
        let config =
            AnalyticsConfig::from_json(r#"{"placeholder_fallback_enabled": false}"#).unwrap();
        assert!(!config.placeholder_fallback_enabled);
        assert_eq!(config.trend_window_size, 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = AnalyticsConfig::from_toml_str("trend_window_size = 0");
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));

        let result = AnalyticsConfig::from_json(r#"{"trend_threshold_percent": -1.0}"#);
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalyticsConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let loaded = AnalyticsConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, loaded);
    }
}
