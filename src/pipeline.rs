//! Pipeline orchestration
//!
//! This module provides the public API for mood analytics.
//! It normalizes the history once, runs every analyzer over the normalized
//! series, generates insights from their combined output, and assembles the
//! result.

use crate::config::AnalyticsConfig;
use crate::correlation::CorrelationEngine;
use crate::encoder::AnalyticsEncoder;
use crate::error::AnalyticsError;
use crate::insights::{InsightGenerator, InsightInputs};
use crate::normalizer::TimeSeriesNormalizer;
use crate::schema::CheckinParser;
use crate::streak::StreakCalculator;
use crate::summary::HistorySummarizer;
use crate::trend::TrendAnalyzer;
use crate::types::{AnalyticsRequest, AnalyticsResult, CheckinRecord, Metric, PeriodLabel};
use crate::variance::VarianceAnalyzer;
use crate::weekly::WeeklyPatternAnalyzer;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, VecDeque};
use uuid::Uuid;

/// Default number of results an `AnalyticsProcessor` keeps
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Compute analytics for a check-in history.
///
/// Pipeline stages:
/// 1. TimeSeriesNormalizer - Daily series, clamping, placeholder fallback
/// 2. Analyzers - Trend, variance, correlation, weekly pattern, streak, summary
/// 3. InsightGenerator - Ordered rules over the analyzer outputs
///
/// Fails only when the config is invalid or normalization fails. Analyzers
/// that lack data report absent or flagged fields instead.
///
/// # Example
/// ```ignore
/// let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(today);
/// let result = compute_analytics(&history, &request, &AnalyticsConfig::default())?;
/// ```
pub fn compute_analytics(
    history: &[CheckinRecord],
    request: &AnalyticsRequest,
    config: &AnalyticsConfig,
) -> Result<AnalyticsResult, AnalyticsError> {
    config.validate()?;

    let series = TimeSeriesNormalizer::normalize(history, request, config)?;

    let trends = TrendAnalyzer::analyze(&series, config);
    let variance = VarianceAnalyzer::analyze(&series, config);
    let correlations = CorrelationEngine::analyze(&series, config);
    let weekly_pattern = WeeklyPatternAnalyzer::analyze(&series);
    let streak = StreakCalculator::calculate(history, request.today);
    let summary = HistorySummarizer::summarize(&series, request.today);

    let insights = InsightGenerator::generate(
        &InsightInputs {
            trends: &trends,
            variance: &variance,
            correlations: &correlations,
            weekly_pattern: &weekly_pattern,
            streak: &streak,
            synthetic: series.synthetic,
        },
        config,
    );

    tracing::debug!(
        period = request.period.as_str(),
        synthetic = series.synthetic,
        correlations = correlations.len(),
        insights = insights.len(),
        "Computed analytics"
    );

    Ok(AnalyticsResult {
        period: request.period,
        range: series.range,
        synthetic: series.synthetic,
        trends,
        variance,
        correlations: CorrelationEngine::to_map(&correlations),
        weekly_pattern,
        streak,
        summary,
        insights,
        series: series.points,
        clamped: series.clamped,
    })
}

/// Convert a JSON array of check-ins into an encoded analytics report.
///
/// # Arguments
/// * `history_json` - JSON array of check-in records
/// * `period` - Period label ("weekly", "monthly" or "custom")
///
/// # Example
/// ```ignore
/// let report = analytics_to_json(history_json, "weekly".to_string())?;
/// ```
pub fn analytics_to_json(history_json: String, period: String) -> Result<String, AnalyticsError> {
    let history = CheckinParser::parse_array(&history_json)?;
    let period: PeriodLabel = period.parse().map_err(AnalyticsError::ParseError)?;
    let result = compute_analytics(
        &history,
        &AnalyticsRequest::new(period),
        &AnalyticsConfig::default(),
    )?;
    AnalyticsEncoder::new().encode_to_json(&result)
}

/// Analytics engine bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a validated configuration
    pub fn with_config(config: AnalyticsConfig) -> Result<Self, AnalyticsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Compute analytics for one request
    pub fn compute(
        &self,
        history: &[CheckinRecord],
        request: &AnalyticsRequest,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        compute_analytics(history, request, &self.config)
    }
}

/// Record fields as compared by the cache; ratings are kept as raw bits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    ratings: [Option<u64>; 5],
    mood_category: Option<String>,
    tags: BTreeSet<String>,
    notes: Option<String>,
}

impl RecordKey {
    fn new(record: &CheckinRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp,
            ratings: Metric::ALL.map(|m| record.metric(m).map(f64::to_bits)),
            mood_category: record.mood_category.clone(),
            tags: record.tags.clone(),
            notes: record.notes.clone(),
        }
    }
}

/// Full inputs of a cached computation; the config is fixed per processor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    request: AnalyticsRequest,
    records: Vec<RecordKey>,
}

/// Stateful processor that memoizes results across calls.
///
/// Cache entries store their full inputs and a hit requires an exact match,
/// so a hit is indistinguishable from recomputing. Use this when the same
/// history is analyzed repeatedly (e.g. switching between period tabs).
pub struct AnalyticsProcessor {
    engine: AnalyticsEngine,
    encoder: AnalyticsEncoder,
    capacity: usize,
    cache: HashMap<CacheKey, AnalyticsResult>,
    insertion_order: VecDeque<CacheKey>,
}

impl Default for AnalyticsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_engine(AnalyticsEngine::new(), DEFAULT_CACHE_CAPACITY)
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: AnalyticsConfig) -> Result<Self, AnalyticsError> {
        Ok(Self::with_engine(
            AnalyticsEngine::with_config(config)?,
            DEFAULT_CACHE_CAPACITY,
        ))
    }

    /// Create a processor around an engine with a cache of `capacity` results
    pub fn with_engine(engine: AnalyticsEngine, capacity: usize) -> Self {
        Self {
            engine,
            encoder: AnalyticsEncoder::new(),
            capacity,
            cache: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        self.engine.config()
    }

    /// Number of cached results
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached result
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.insertion_order.clear();
    }

    /// Compute analytics, reusing a cached result when the inputs match
    pub fn compute(
        &mut self,
        history: &[CheckinRecord],
        request: &AnalyticsRequest,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        let key = CacheKey {
            request: request.clone(),
            records: history.iter().map(RecordKey::new).collect(),
        };

        if let Some(result) = self.cache.get(&key) {
            tracing::info!(
                period = request.period.as_str(),
                records = history.len(),
                "Analytics cache hit"
            );
            return Ok(result.clone());
        }

        let result = self.engine.compute(history, request)?;
        self.store(key, result.clone());
        Ok(result)
    }

    /// Parse a JSON history, compute analytics, and encode the report
    pub fn compute_json(
        &mut self,
        history_json: &str,
        request: &AnalyticsRequest,
    ) -> Result<String, AnalyticsError> {
        let history = CheckinParser::parse_array(history_json)?;
        let result = self.compute(&history, request)?;
        self.encoder.encode_to_json(&result)
    }

    fn store(&mut self, key: CacheKey, result: AnalyticsResult) {
        if self.capacity == 0 {
            return;
        }
        while self.cache.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.cache.remove(&oldest);
                }
                None => break,
            }
        }
        self.insertion_order.push_back(key.clone());
        self.cache.insert(key, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ClampReason, DayOfWeek, InsightImpact, InsightKind, PatternStatus, TrendDirection,
    };
    use chrono::{Days, NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checkin(day: NaiveDate, mood: f64) -> CheckinRecord {
        let timestamp = Utc.from_utc_datetime(&day.and_hms_opt(9, 0, 0).unwrap());
        CheckinRecord::new(timestamp, mood)
    }

    /// One check-in per day starting at `start`
    fn daily_history(start: NaiveDate, moods: &[f64]) -> Vec<CheckinRecord> {
        moods
            .iter()
            .enumerate()
            .map(|(i, &mood)| checkin(start + Days::new(i as u64), mood))
            .collect()
    }

    fn mixed_history() -> Vec<CheckinRecord> {
        let start = date(2024, 3, 1);
        (0..45u64)
            .filter(|i| i % 6 != 5)
            .map(|i| {
                let mut record = checkin(start + Days::new(i), 3.0 + (i % 7) as f64);
                record.stress = Some(9.0 - (i % 5) as f64);
                record.sleep_quality = Some(4.0 + (i % 4) as f64);
                if i % 3 == 0 {
                    record.tags.insert("exercise".to_string());
                }
                let category = if i % 2 == 0 { "calm" } else { "tired" };
                record.mood_category = Some(category.to_string());
                record
            })
            .collect()
    }

    #[test]
    fn test_recompute_is_byte_identical() {
        let history = mixed_history();
        let request = AnalyticsRequest::new(PeriodLabel::Monthly).with_today(date(2024, 4, 14));
        let config = AnalyticsConfig::default();

        let first = compute_analytics(&history, &request, &config).unwrap();
        let second = compute_analytics(&history, &request, &config).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_single_checkin() {
        let today = date(2024, 1, 10);
        let history = vec![checkin(today, 6.0)];
        let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(today);
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.streak.current, 1);
        assert_eq!(result.streak.longest, 1);
        let mood_variance = &result.variance[&Metric::Mood];
        assert_eq!(mood_variance.variance, 0.0);
        assert!(!mood_variance.computable);
        assert_eq!(result.weekly_pattern.status, PatternStatus::InsufficientData);
        assert!(!result.synthetic);
    }

    #[test]
    fn test_streak_covers_history_beyond_period() {
        let today = date(2024, 6, 30);
        let history = daily_history(today - Days::new(39), &[6.0; 40]);
        let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(today);
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.range.len_days(), 28);
        assert_eq!(result.streak.current, 40);
        assert_eq!(result.streak.longest, 40);
        assert_eq!(result.streak.total_checkins, 40);
        assert_eq!(result.streak.current_start, Some(today - Days::new(39)));
    }

    #[test]
    fn test_constant_mood_is_stable() {
        let start = date(2024, 1, 1);
        let history = daily_history(start, &[7.0; 30]);
        let request = AnalyticsRequest::new(PeriodLabel::Monthly).with_today(date(2024, 1, 30));
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        let mood_variance = &result.variance[&Metric::Mood];
        assert!(mood_variance.computable);
        assert_eq!(mood_variance.variance, 0.0);
        assert_eq!(result.trends[&Metric::Mood].direction, TrendDirection::Stable);

        let stability = result
            .insights
            .iter()
            .find(|i| i.kind == InsightKind::Stability)
            .unwrap();
        assert_eq!(stability.impact, InsightImpact::Positive);
        assert_eq!(result.streak.current, 30);
    }

    #[test]
    fn test_increasing_mood_is_improving() {
        let start = date(2024, 1, 1);
        let moods: Vec<f64> = (1..=14).map(f64::from).collect();
        let history = daily_history(start, &moods);
        let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(date(2024, 1, 14));
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        let trend = &result.trends[&Metric::Mood];
        assert!(trend.recent_average.unwrap() > trend.prior_average.unwrap());
        assert!(trend.percent_change > 5.0);
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_eq!(result.insights[0].kind, InsightKind::Trend);
        assert_eq!(result.insights[0].impact, InsightImpact::Positive);
    }

    #[test]
    fn test_anti_correlated_stress() {
        let start = date(2024, 2, 1);
        let history: Vec<CheckinRecord> = (1..=10)
            .map(|m| {
                let mut record = checkin(start + Days::new(m as u64), m as f64);
                record.stress = Some(11.0 - m as f64);
                record
            })
            .collect();
        let request = AnalyticsRequest::new(PeriodLabel::Custom);
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        assert!((result.correlations["stress"] + 1.0).abs() < 1e-9);
        let correlation = result
            .insights
            .iter()
            .find(|i| i.kind == InsightKind::Correlation)
            .unwrap();
        assert_eq!(correlation.title, "Higher stress is linked to lower mood");
    }

    #[test]
    fn test_empty_history_fallback() {
        let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(date(2024, 6, 30));

        let result = compute_analytics(&[], &request, &AnalyticsConfig::default()).unwrap();
        assert!(result.synthetic);
        assert_eq!(result.series.len(), 30);
        assert_eq!(result.range.end, date(2024, 6, 30));
        assert!(result.insights.is_empty());
        assert_eq!(result.streak.current, 0);
        assert_eq!(result.summary.total_checkins, 0);

        let config = AnalyticsConfig {
            placeholder_fallback_enabled: false,
            ..Default::default()
        };
        assert!(matches!(
            compute_analytics(&[], &request, &config),
            Err(AnalyticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_weekday_tie_resolves_to_monday() {
        // 2024-01-01 is a Monday
        let history = daily_history(date(2024, 1, 1), &[6.0; 7]);
        let request = AnalyticsRequest::new(PeriodLabel::Custom);
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.weekly_pattern.best_day, Some(DayOfWeek::Monday));
        assert_eq!(result.weekly_pattern.worst_day, Some(DayOfWeek::Monday));
    }

    #[test]
    fn test_out_of_range_values_clamped_and_flagged() {
        let today = date(2024, 5, 3);
        let mut history = daily_history(date(2024, 5, 1), &[5.0, 6.0]);
        history.push(checkin(today, 14.0));
        let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(today);
        let result = compute_analytics(&history, &request, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.clamped.len(), 1);
        assert_eq!(result.clamped[0].reason, ClampReason::AboveRange);
        assert_eq!(result.series.last().unwrap().mood, Some(10.0));
        assert_eq!(result.summary.mood_range.as_ref().unwrap().max, 10.0);
    }

    #[test]
    fn test_insights_capped() {
        let history = mixed_history();
        let request = AnalyticsRequest::new(PeriodLabel::Monthly).with_today(date(2024, 4, 14));
        let config = AnalyticsConfig {
            max_insights: 1,
            ..Default::default()
        };
        let result = compute_analytics(&history, &request, &config).unwrap();
        assert!(result.insights.len() <= 1);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let history = daily_history(date(2024, 1, 1), &[5.0]);

        let reversed = AnalyticsRequest::new(PeriodLabel::Custom)
            .with_range(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(
            compute_analytics(&history, &reversed, &AnalyticsConfig::default()),
            Err(AnalyticsError::InvalidDateRange { .. })
        ));

        let huge = AnalyticsRequest::new(PeriodLabel::Custom)
            .with_range(date(1900, 1, 1), date(2024, 1, 1));
        assert!(matches!(
            compute_analytics(&history, &huge, &AnalyticsConfig::default()),
            Err(AnalyticsError::RangeTooLarge { .. })
        ));

        let bad_config = AnalyticsConfig {
            trend_window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            compute_analytics(&history, &AnalyticsRequest::new(PeriodLabel::Weekly), &bad_config),
            Err(AnalyticsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_analytics_to_json() {
        let json = r#"[
            {"timestamp": "2024-03-01T09:00:00Z", "mood": 6},
            {"timestamp": "2024-03-02T09:00:00Z", "mood": 7},
            {"timestamp": "2024-03-03T09:00:00Z", "mood": 8}
        ]"#;
        let report = analytics_to_json(json.to_string(), "weekly".to_string()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(parsed["producer"]["name"], crate::PRODUCER_NAME);
        assert_eq!(parsed["result"]["period"], "weekly");
        assert_eq!(parsed["result"]["streak"]["current"], 3);
        assert_eq!(parsed["result"]["range"]["end"], "2024-03-03");

        assert!(analytics_to_json(json.to_string(), "daily".to_string()).is_err());
        assert!(analytics_to_json("not json".to_string(), "weekly".to_string()).is_err());
    }

    #[test]
    fn test_processor_cache_matches_recompute() {
        let history = mixed_history();
        let request = AnalyticsRequest::new(PeriodLabel::Monthly).with_today(date(2024, 4, 14));
        let mut processor = AnalyticsProcessor::new();

        let first = processor.compute(&history, &request).unwrap();
        let cached = processor.compute(&history, &request).unwrap();
        let fresh = AnalyticsEngine::new().compute(&history, &request).unwrap();

        assert_eq!(processor.cached_results(), 1);
        assert_eq!(first, cached);
        assert_eq!(cached, fresh);

        let weekly = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(date(2024, 4, 14));
        processor.compute(&history, &weekly).unwrap();
        assert_eq!(processor.cached_results(), 2);

        processor.clear_cache();
        assert_eq!(processor.cached_results(), 0);
    }

    #[test]
    fn test_processor_separates_nan_and_infinite_ratings() {
        let day = date(2024, 4, 1);
        let mut nan = checkin(day, 6.0);
        nan.energy = Some(f64::NAN);
        let mut infinite = checkin(day, 6.0);
        infinite.energy = Some(f64::INFINITY);
        let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(day);
        let mut processor = AnalyticsProcessor::new();

        let first = processor.compute(&[nan], &request).unwrap();
        let second = processor.compute(&[infinite], &request).unwrap();

        assert_eq!(processor.cached_results(), 2);
        assert!(first.clamped[0].original.is_nan());
        assert!(second.clamped[0].original.is_infinite());
    }

    #[test]
    fn test_processor_evicts_oldest() {
        let history = mixed_history();
        let mut processor = AnalyticsProcessor::with_engine(AnalyticsEngine::new(), 2);

        for day in 10..14 {
            let request = AnalyticsRequest::new(PeriodLabel::Weekly).with_today(date(2024, 4, day));
            processor.compute(&history, &request).unwrap();
        }
        assert_eq!(processor.cached_results(), 2);
    }

    #[test]
    fn test_processor_rejects_invalid_config() {
        let config = AnalyticsConfig {
            max_insights: 0,
            ..Default::default()
        };
        assert!(AnalyticsProcessor::with_config(config).is_err());
    }
}
