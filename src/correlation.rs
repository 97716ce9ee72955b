//! Correlation engine
//!
//! Pearson correlation between mood and each contextual factor, over
//! pairwise-complete days only. Factors without enough paired observations,
//! or whose paired values never vary, are omitted rather than reported as 0.

use crate::config::AnalyticsConfig;
use crate::types::{Factor, Metric, TimeSeries};
use serde::Serialize;
use std::collections::BTreeMap;

/// Correlation between mood and one factor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorCorrelation {
    pub factor: Factor,
    /// Pearson coefficient (-1 to 1)
    pub coefficient: f64,
    /// Number of pairwise-complete days used
    pub sample_size: usize,
}

/// Correlation engine for mood vs contextual factors
pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Factors examined under a config: rated metrics, then configured tags
    pub fn factors(config: &AnalyticsConfig) -> Vec<Factor> {
        let mut factors: Vec<Factor> = Metric::FACTORS.iter().copied().map(Factor::Metric).collect();
        let mut tags: Vec<&String> = config.correlation_tags.iter().collect();
        tags.sort();
        tags.dedup();
        factors.extend(tags.into_iter().map(|t| Factor::Tag(t.clone())));
        factors
    }

    /// Correlate mood with every factor that has enough paired data
    pub fn analyze(series: &TimeSeries, config: &AnalyticsConfig) -> Vec<FactorCorrelation> {
        Self::factors(config)
            .into_iter()
            .filter_map(|factor| {
                let (mood, other): (Vec<f64>, Vec<f64>) = series
                    .points
                    .iter()
                    .filter_map(|p| Some((p.mood?, p.factor_value(&factor)?)))
                    .unzip();

                if mood.len() < config.correlation_min_observations {
                    tracing::debug!(
                        factor = %factor.key(),
                        pairs = mood.len(),
                        "Skipping factor with too few paired observations"
                    );
                    return None;
                }

                pearson_correlation(&mood, &other).map(|coefficient| FactorCorrelation {
                    factor,
                    coefficient,
                    sample_size: mood.len(),
                })
            })
            .collect()
    }

    /// Key the correlations the way the result reports them
    pub fn to_map(correlations: &[FactorCorrelation]) -> BTreeMap<String, f64> {
        correlations
            .iter()
            .map(|c| (c.factor.key(), c.coefficient))
            .collect()
    }

    /// Strongest correlation with magnitude at or above `threshold`.
    ///
    /// Ties keep the earlier factor, so the result is stable across runs.
    pub fn strongest(
        correlations: &[FactorCorrelation],
        threshold: f64,
    ) -> Option<&FactorCorrelation> {
        correlations
            .iter()
            .filter(|c| c.coefficient.abs() >= threshold)
            .fold(None, |best: Option<&FactorCorrelation>, c| match best {
                Some(b) if b.coefficient.abs() >= c.coefficient.abs() => Some(b),
                _ => Some(c),
            })
    }
}

/// Calculate the Pearson correlation coefficient.
///
/// Returns None when the inputs differ in length, are empty, or either side
/// has zero variance (the coefficient is undefined).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    let denominator = (sum_xx * sum_yy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    Some((sum_xy / denominator).clamp(-1.0, 1.0))
}
