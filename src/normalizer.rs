//! Time series normalization
//!
//! This module turns an unordered check-in history into a gap-aware daily series.
//! - One point per calendar day in the requested range
//! - Days without a check-in keep every metric absent (never zero, never interpolated)
//! - Same-day duplicates resolve to the latest timestamp
//! - Out-of-range ratings are clamped to 1-10 and flagged
//! - Empty histories fall back to a seeded placeholder series

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::types::{
    AnalyticsRequest, CheckinRecord, ClampReason, ClampedValue, DailyPoint, DateRange, Metric,
    TimeSeries, RATING_MAX, RATING_MIN,
};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// Length of the placeholder series shown to users without history
pub const PLACEHOLDER_DAYS: u64 = 30;

/// Seed for the placeholder pattern
const PLACEHOLDER_SEED: u64 = 0x5EED_CAFE_F00D_2024;

/// Anchor for the placeholder series when the request names no date at all
fn placeholder_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Normalizer for converting check-in histories into daily series
pub struct TimeSeriesNormalizer;

impl TimeSeriesNormalizer {
    /// Normalize a history over the range implied by the request.
    ///
    /// Fails with `InsufficientData` only when the history is empty and the
    /// placeholder fallback is disabled.
    pub fn normalize(
        history: &[CheckinRecord],
        request: &AnalyticsRequest,
        config: &AnalyticsConfig,
    ) -> Result<TimeSeries, AnalyticsError> {
        if history.is_empty() {
            if !config.placeholder_fallback_enabled {
                return Err(AnalyticsError::InsufficientData(
                    "history is empty and the placeholder fallback is disabled".to_string(),
                ));
            }
            let anchor = request
                .date_range
                .map(|r| r.end)
                .or(request.today)
                .unwrap_or_else(placeholder_anchor);
            tracing::warn!(%anchor, "Empty history, using synthetic placeholder series");
            return Ok(placeholder_series(anchor));
        }

        let range = resolve_range(history, request)?;
        if request.date_range.is_some() && range.len_days() > config.max_range_days {
            return Err(AnalyticsError::RangeTooLarge {
                days: range.len_days(),
                limit: config.max_range_days,
            });
        }

        // Later timestamps win; the stable sort keeps input order for equal timestamps
        let mut sorted: Vec<&CheckinRecord> = history.iter().collect();
        sorted.sort_by_key(|r| r.timestamp);

        let mut by_day: BTreeMap<NaiveDate, &CheckinRecord> = BTreeMap::new();
        for record in sorted {
            let date = record.date();
            if range.contains(date) {
                by_day.insert(date, record);
            }
        }

        let mut clamped = Vec::new();
        let mut points = Vec::with_capacity(range.len_days() as usize);
        for date in range.start.iter_days().take_while(|d| *d <= range.end) {
            let point = match by_day.get(&date) {
                Some(record) => checkin_point(record, &mut clamped),
                None => DailyPoint::empty(date),
            };
            points.push(point);
        }

        if !clamped.is_empty() {
            tracing::warn!(count = clamped.len(), "Clamped out-of-range check-in values");
        }
        tracing::debug!(
            start = %range.start,
            end = %range.end,
            days = points.len(),
            checkins = by_day.len(),
            "Normalized check-in history"
        );

        Ok(TimeSeries {
            range,
            points,
            synthetic: false,
            clamped,
        })
    }
}

/// Resolve the inclusive date range a request covers.
///
/// Explicit ranges win. Otherwise the range ends at `today` (or the latest
/// check-in) and spans the period's default length; `Custom` without a range
/// covers the whole history.
pub fn resolve_range(
    history: &[CheckinRecord],
    request: &AnalyticsRequest,
) -> Result<DateRange, AnalyticsError> {
    if let Some(range) = request.date_range {
        if range.start > range.end {
            return Err(AnalyticsError::InvalidDateRange {
                start: range.start,
                end: range.end,
            });
        }
        return Ok(range);
    }

    let earliest = history.iter().map(|r| r.date()).min();
    let latest = history.iter().map(|r| r.date()).max();
    let end = match (request.today, latest) {
        (Some(today), _) => today,
        (None, Some(latest)) => latest,
        (None, None) => {
            return Err(AnalyticsError::InsufficientData(
                "cannot infer a date range from an empty history".to_string(),
            ))
        }
    };

    let start = match request.period.default_span_days() {
        Some(span) => end
            .checked_sub_days(Days::new((span - 1) as u64))
            .unwrap_or(NaiveDate::MIN),
        None => earliest.map_or(end, |e| e.min(end)),
    };

    Ok(DateRange::new(start, end))
}

/// Build the point for a check-in day, clamping ratings into range
fn checkin_point(record: &CheckinRecord, clamped: &mut Vec<ClampedValue>) -> DailyPoint {
    let date = record.date();
    let mut point = DailyPoint::empty(date);
    point.checked_in = true;
    point.mood_category = record.mood_category.clone();
    point.tags = record.tags.clone();

    for metric in Metric::ALL {
        let Some(raw) = record.metric(metric) else {
            continue;
        };
        let (value, reason) = clamp_rating(raw);
        if let Some(reason) = reason {
            clamped.push(ClampedValue {
                record_id: record.id,
                date,
                metric,
                original: raw,
                adjusted: value,
                reason,
            });
        }
        point.set_value(metric, value);
    }

    point
}

/// Clamp a rating into 1-10; non-finite values become absent
fn clamp_rating(value: f64) -> (Option<f64>, Option<ClampReason>) {
    if !value.is_finite() {
        (None, Some(ClampReason::NonFinite))
    } else if value < RATING_MIN {
        (Some(RATING_MIN), Some(ClampReason::BelowRange))
    } else if value > RATING_MAX {
        (Some(RATING_MAX), Some(ClampReason::AboveRange))
    } else {
        (Some(value), None)
    }
}

/// Deterministic 30-day placeholder ending at `anchor`.
///
/// The pattern is a pure function of a fixed seed so concurrent requests
/// always see the same chart.
pub fn placeholder_series(anchor: NaiveDate) -> TimeSeries {
    let start = anchor
        .checked_sub_days(Days::new(PLACEHOLDER_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    let mut rng = SeededPattern::new(PLACEHOLDER_SEED);

    let points = start
        .iter_days()
        .take(PLACEHOLDER_DAYS as usize)
        .enumerate()
        .map(|(i, date)| {
            let weekly = (i as f64 * std::f64::consts::TAU / 7.0).sin();
            let mood = round_rating(6.0 + 1.5 * weekly + rng.jitter(0.75));
            let mut point = DailyPoint::empty(date);
            point.checked_in = true;
            point.mood = Some(mood);
            point.energy = Some(round_rating(mood - 0.5 + rng.jitter(1.0)));
            point.stress = Some(round_rating(11.0 - mood + rng.jitter(1.0)));
            point.sleep_quality = Some(round_rating(6.5 + rng.jitter(1.5)));
            point.social_interaction = Some(round_rating(5.5 + rng.jitter(2.0)));
            if rng.next_unit() < 0.4 {
                point.tags.insert("exercise".to_string());
            }
            point
        })
        .collect();

    TimeSeries {
        range: DateRange::new(start, anchor),
        points,
        synthetic: true,
        clamped: Vec::new(),
    }
}

/// Round to one decimal place and keep inside the rating scale
fn round_rating(value: f64) -> f64 {
    ((value * 10.0).round() / 10.0).clamp(RATING_MIN, RATING_MAX)
}

/// Minimal linear congruential generator (Knuth MMIX constants)
struct SeededPattern {
    state: u64,
}

impl SeededPattern {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0, 1)
    fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Next value in [-amplitude, amplitude)
    fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.next_unit() * 2.0 - 1.0) * amplitude
    }
}
