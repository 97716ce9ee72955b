//! Variance and stability analysis
//!
//! Population variance (divide by N) of each metric over the most recent
//! `2 × trend_window_size` days, the same span the trend analyzer inspects.

use crate::config::AnalyticsConfig;
use crate::types::{Metric, TimeSeries, VarianceReading};
use std::collections::BTreeMap;

/// Variance analyzer for metric dispersion
pub struct VarianceAnalyzer;

impl VarianceAnalyzer {
    /// Compute a variance reading for every metric
    pub fn analyze(
        series: &TimeSeries,
        config: &AnalyticsConfig,
    ) -> BTreeMap<Metric, VarianceReading> {
        let window = series.tail(config.trend_window_size.saturating_mul(2));

        Metric::ALL
            .iter()
            .map(|&metric| {
                let values: Vec<f64> = window.iter().filter_map(|p| p.value(metric)).collect();
                (metric, variance_reading(&values))
            })
            .collect()
    }

    /// Whether a reading qualifies as a stable pattern
    pub fn is_stable(reading: &VarianceReading, config: &AnalyticsConfig) -> bool {
        reading.computable
            && reading.sample_size >= config.stability_min_points
            && reading.variance < config.stability_variance_threshold
    }
}

/// Population variance; fewer than two values is reported as not computable
pub fn variance_reading(values: &[f64]) -> VarianceReading {
    if values.len() < 2 {
        return VarianceReading {
            variance: 0.0,
            computable: false,
            sample_size: values.len(),
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    VarianceReading {
        variance: variance.max(0.0),
        computable: true,
        sample_size: values.len(),
    }
}
