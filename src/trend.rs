//! Trend analysis
//!
//! Compares the most recent window of days against the window immediately
//! preceding it, per metric. The ±threshold classification is a policy
//! constant from the config, not a statistical test.

use crate::config::AnalyticsConfig;
use crate::types::{DailyPoint, Metric, MetricTrend, TimeSeries, TrendDirection};
use std::collections::BTreeMap;

/// Available values required in each window before a trend is reported
const MIN_WINDOW_POINTS: usize = 2;

/// Trend analyzer for recent-vs-prior window comparisons
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// Compute a trend for every metric
    pub fn analyze(series: &TimeSeries, config: &AnalyticsConfig) -> BTreeMap<Metric, MetricTrend> {
        Metric::ALL
            .iter()
            .map(|&metric| (metric, Self::metric_trend(series, metric, config)))
            .collect()
    }

    /// Compute the trend of a single metric
    pub fn metric_trend(
        series: &TimeSeries,
        metric: Metric,
        config: &AnalyticsConfig,
    ) -> MetricTrend {
        let (prior, recent) = split_windows(&series.points, config.trend_window_size);

        let (Some(recent_avg), Some(prior_avg)) =
            (window_average(recent, metric), window_average(prior, metric))
        else {
            return MetricTrend::stable();
        };

        if prior_avg == 0.0 {
            return MetricTrend::stable();
        }

        let percent_change = (recent_avg - prior_avg) / prior_avg.abs() * 100.0;
        MetricTrend {
            direction: classify(percent_change, config.trend_threshold_percent),
            percent_change,
            recent_average: Some(recent_avg),
            prior_average: Some(prior_avg),
        }
    }
}

/// Split the tail of the series into (prior, recent) windows of `size` days
fn split_windows(points: &[DailyPoint], size: usize) -> (&[DailyPoint], &[DailyPoint]) {
    let recent_start = points.len().saturating_sub(size);
    let prior_start = recent_start.saturating_sub(size);
    (&points[prior_start..recent_start], &points[recent_start..])
}

/// Mean over available values; None when fewer than two are present
fn window_average(window: &[DailyPoint], metric: Metric) -> Option<f64> {
    let values: Vec<f64> = window.iter().filter_map(|p| p.value(metric)).collect();
    if values.len() < MIN_WINDOW_POINTS {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn classify(percent_change: f64, threshold: f64) -> TrendDirection {
    if percent_change > threshold {
        TrendDirection::Improving
    } else if percent_change < -threshold {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}
