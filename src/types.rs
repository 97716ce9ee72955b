//! Core types for the mood analytics pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw check-in records, the normalized daily series, per-analyzer
//! outputs, and the final analytics result.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Lowest valid value on the 1-10 rating scale
pub const RATING_MIN: f64 = 1.0;

/// Highest valid value on the 1-10 rating scale
pub const RATING_MAX: f64 = 10.0;

/// One user-submitted daily check-in.
///
/// Records are owned by the caller's history collection; the engine only ever
/// borrows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRecord {
    /// Record identifier, used when reporting clamped values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// When the check-in was recorded (UTC)
    pub timestamp: DateTime<Utc>,
    /// Mood rating (1-10)
    pub mood: f64,
    /// Energy level (1-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    /// Stress level (1-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,
    /// Previous night's sleep quality (1-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<f64>,
    /// Social interaction level (1-10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_interaction: Option<f64>,
    /// Categorical mood description (e.g. "calm", "anxious")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_category: Option<String>,
    /// User-selected tags (e.g. "exercise", "work")
    #[serde(default, alias = "keywords")]
    pub tags: BTreeSet<String>,
    /// Free-text notes, never analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CheckinRecord {
    /// Create a record with only the required fields set
    pub fn new(timestamp: DateTime<Utc>, mood: f64) -> Self {
        Self {
            id: None,
            timestamp,
            mood,
            energy: None,
            stress: None,
            sleep_quality: None,
            social_interaction: None,
            mood_category: None,
            tags: BTreeSet::new(),
            notes: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Calendar day (UTC) this record belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Raw value of a metric as submitted
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mood => Some(self.mood),
            Metric::Energy => self.energy,
            Metric::Stress => self.stress,
            Metric::SleepQuality => self.sleep_quality,
            Metric::SocialInteraction => self.social_interaction,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Rated metrics carried by a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Mood,
    Energy,
    Stress,
    SleepQuality,
    SocialInteraction,
}

impl Metric {
    /// All metrics in reporting order
    pub const ALL: [Metric; 5] = [
        Metric::Mood,
        Metric::Energy,
        Metric::Stress,
        Metric::SleepQuality,
        Metric::SocialInteraction,
    ];

    /// Contextual factors correlated against mood
    pub const FACTORS: [Metric; 4] = [
        Metric::Energy,
        Metric::Stress,
        Metric::SleepQuality,
        Metric::SocialInteraction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Mood => "mood",
            Metric::Energy => "energy",
            Metric::Stress => "stress",
            Metric::SleepQuality => "sleep_quality",
            Metric::SocialInteraction => "social_interaction",
        }
    }

    /// Human-readable label used in insight text
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Mood => "mood",
            Metric::Energy => "energy",
            Metric::Stress => "stress",
            Metric::SleepQuality => "sleep quality",
            Metric::SocialInteraction => "social interaction",
        }
    }
}

/// Coarse-grain window an analytics request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodLabel {
    Weekly,
    Monthly,
    Custom,
}

impl PeriodLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodLabel::Weekly => "weekly",
            PeriodLabel::Monthly => "monthly",
            PeriodLabel::Custom => "custom",
        }
    }

    /// Default number of days covered when no explicit range is requested.
    /// `Custom` has no default span; it covers the whole history.
    pub fn default_span_days(&self) -> Option<i64> {
        match self {
            PeriodLabel::Weekly => Some(28),
            PeriodLabel::Monthly => Some(90),
            PeriodLabel::Custom => None,
        }
    }
}

impl std::str::FromStr for PeriodLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PeriodLabel::Weekly),
            "monthly" => Ok(PeriodLabel::Monthly),
            "custom" => Ok(PeriodLabel::Custom),
            other => Err(format!("unknown period label: {other}")),
        }
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of calendar days in the range (0 if inverted)
    pub fn len_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Parameters of a single analytics request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub period: PeriodLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Reference "today"; when absent the latest check-in date is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
}

impl AnalyticsRequest {
    pub fn new(period: PeriodLabel) -> Self {
        Self {
            period,
            date_range: None,
            today: None,
        }
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// Reason a submitted value was altered at the normalizer boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampReason {
    BelowRange,
    AboveRange,
    NonFinite,
}

/// A record value that was clamped (or discarded as non-finite) during normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    pub date: NaiveDate,
    pub metric: Metric,
    pub original: f64,
    /// Value used downstream; absent when the original was not a finite number
    pub adjusted: Option<f64>,
    pub reason: ClampReason,
}

/// One calendar day of the normalized series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// Whether a check-in exists for this day
    pub checked_in: bool,
    pub mood: Option<f64>,
    pub energy: Option<f64>,
    pub stress: Option<f64>,
    pub sleep_quality: Option<f64>,
    pub social_interaction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_category: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl DailyPoint {
    /// A day without any check-in
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            checked_in: false,
            mood: None,
            energy: None,
            stress: None,
            sleep_quality: None,
            social_interaction: None,
            mood_category: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mood => self.mood,
            Metric::Energy => self.energy,
            Metric::Stress => self.stress,
            Metric::SleepQuality => self.sleep_quality,
            Metric::SocialInteraction => self.social_interaction,
        }
    }

    pub(crate) fn set_value(&mut self, metric: Metric, value: Option<f64>) {
        match metric {
            Metric::Mood => self.mood = value,
            Metric::Energy => self.energy = value,
            Metric::Stress => self.stress = value,
            Metric::SleepQuality => self.sleep_quality = value,
            Metric::SocialInteraction => self.social_interaction = value,
        }
    }

    /// Value of a contextual factor for this day.
    ///
    /// Tag factors are 1.0/0.0 on check-in days and absent otherwise.
    pub fn factor_value(&self, factor: &Factor) -> Option<f64> {
        match factor {
            Factor::Metric(metric) => self.value(*metric),
            Factor::Tag(tag) if self.checked_in => {
                Some(if self.tags.contains(tag) { 1.0 } else { 0.0 })
            }
            Factor::Tag(_) => None,
        }
    }
}

/// Gap-aware daily series: one point per calendar day, strictly increasing dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub range: DateRange,
    pub points: Vec<DailyPoint>,
    /// True when the series is the placeholder generated for an empty history
    pub synthetic: bool,
    /// Values altered at the normalizer boundary
    #[serde(default)]
    pub clamped: Vec<ClampedValue>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Available values of a metric, in date order
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value(metric)).collect()
    }

    /// The most recent `days` points (or all points if fewer)
    pub fn tail(&self, days: usize) -> &[DailyPoint] {
        let start = self.points.len().saturating_sub(days);
        &self.points[start..]
    }

    /// Date of the most recent day with a check-in
    pub fn last_checkin_date(&self) -> Option<NaiveDate> {
        self.points.iter().rev().find(|p| p.checked_in).map(|p| p.date)
    }
}

/// Contextual factor correlated against mood
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Metric(Metric),
    Tag(String),
}

impl Factor {
    /// Key used in the `correlations` map
    pub fn key(&self) -> String {
        match self {
            Factor::Metric(metric) => metric.as_str().to_string(),
            Factor::Tag(tag) => format!("tag:{tag}"),
        }
    }
}

/// Direction of a metric between the prior and recent window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Recent-vs-prior comparison for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub direction: TrendDirection,
    pub percent_change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_average: Option<f64>,
}

impl MetricTrend {
    /// Trend reported when either window lacks signal
    pub fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            percent_change: 0.0,
            recent_average: None,
            prior_average: None,
        }
    }
}

/// Population variance of one metric over the variance window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReading {
    pub variance: f64,
    /// False when fewer than two values were available
    pub computable: bool,
    pub sample_size: usize,
}

/// ISO weekday, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// ISO index, Monday = 1 ... Sunday = 7
    pub fn iso_index(&self) -> u32 {
        match self {
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
            DayOfWeek::Sunday => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Whether the weekly pattern could be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Resolved,
    InsufficientData,
}

/// Mean mood for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    pub day: DayOfWeek,
    pub average: f64,
    pub count: usize,
}

/// Mood grouped by weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPattern {
    pub status: PatternStatus,
    pub best_day: Option<DayOfWeek>,
    pub worst_day: Option<DayOfWeek>,
    /// Weekdays with at least one observation, Monday first
    pub averages: Vec<WeekdayAverage>,
}

/// Consecutive-day check-in counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_start: Option<NaiveDate>,
    pub total_checkins: u32,
}

/// Minimum and maximum mood observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRange {
    pub min: f64,
    pub max: f64,
}

/// Descriptive statistics over the checked-in days of the range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_checkins: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_mood: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_range: Option<MoodRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_category: Option<String>,
    pub keyword_frequency: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_checkin: Option<i64>,
}

/// Polarity of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightImpact {
    Positive,
    Negative,
    Neutral,
}

/// Rule family an insight came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trend,
    Stability,
    Correlation,
    WeeklyPattern,
    Streak,
}

/// Human-readable statement derived from a fixed rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub impact: InsightImpact,
}

/// The engine's sole output, created fresh for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub period: PeriodLabel,
    pub range: DateRange,
    /// True when computed over the placeholder series
    pub synthetic: bool,
    pub trends: BTreeMap<Metric, MetricTrend>,
    pub variance: BTreeMap<Metric, VarianceReading>,
    /// Factor key -> Pearson coefficient in [-1, 1]
    pub correlations: BTreeMap<String, f64>,
    pub weekly_pattern: WeeklyPattern,
    pub streak: StreakSummary,
    pub summary: HistorySummary,
    pub insights: Vec<Insight>,
    pub series: Vec<DailyPoint>,
    pub clamped: Vec<ClampedValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_record_is_deterministic() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();
        let first = CheckinRecord::new(timestamp, 7.0);
        let second = CheckinRecord::new(timestamp, 7.0);

        assert_eq!(first, second);
        assert_eq!(first.id, None);

        let id = Uuid::nil();
        assert_eq!(first.with_id(id).id, Some(id));
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let json = r#"{
            "timestamp": "2024-01-15T08:30:00Z",
            "mood": 7.5,
            "stress": 3.0,
            "keywords": ["exercise", "work"]
        }"#;
        let record: CheckinRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.mood, 7.5);
        assert_eq!(record.stress, Some(3.0));
        assert_eq!(record.energy, None);
        assert!(record.has_tag("exercise"));
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_period_label_parse() {
        assert_eq!("weekly".parse::<PeriodLabel>(), Ok(PeriodLabel::Weekly));
        assert_eq!(" Monthly ".parse::<PeriodLabel>(), Ok(PeriodLabel::Monthly));
        assert!("daily".parse::<PeriodLabel>().is_err());
    }

    #[test]
    fn test_tag_factor_absent_without_checkin() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut point = DailyPoint::empty(date);
        let exercise = Factor::Tag("exercise".to_string());

        assert_eq!(point.factor_value(&exercise), None);

        point.checked_in = true;
        assert_eq!(point.factor_value(&exercise), Some(0.0));

        point.tags.insert("exercise".to_string());
        assert_eq!(point.factor_value(&exercise), Some(1.0));
    }

    #[test]
    fn test_date_range_len() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        assert_eq!(DateRange::new(start, end).len_days(), 30);
        assert_eq!(DateRange::new(end, start).len_days(), 0);
    }

    #[test]
    fn test_result_maps_serialize_in_order() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let record = CheckinRecord::new(ts, 6.0);
        assert_eq!(record.metric(Metric::Mood), Some(6.0));

        let mut trends = BTreeMap::new();
        trends.insert(Metric::Stress, MetricTrend::stable());
        trends.insert(Metric::Mood, MetricTrend::stable());
        let json = serde_json::to_string(&trends).unwrap();
        assert!(json.find("mood").unwrap() < json.find("stress").unwrap());
    }
}
