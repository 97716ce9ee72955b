//! Descriptive history summary
//!
//! Totals, mood average and range, the most common mood category, and tag
//! frequencies over the checked-in days of the analysis range.

use crate::types::{HistorySummary, MoodRange, TimeSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Summary builder over a normalized series
pub struct HistorySummarizer;

impl HistorySummarizer {
    /// Summarize the series. Synthetic series summarize as empty.
    pub fn summarize(series: &TimeSeries, today: Option<NaiveDate>) -> HistorySummary {
        if series.synthetic {
            return HistorySummary::default();
        }

        let checked: Vec<_> = series.points.iter().filter(|p| p.checked_in).collect();
        let moods: Vec<f64> = checked.iter().filter_map(|p| p.mood).collect();

        let average_mood =
            (!moods.is_empty()).then(|| moods.iter().sum::<f64>() / moods.len() as f64);
        let mood_range = (!moods.is_empty()).then(|| MoodRange {
            min: moods.iter().copied().fold(f64::INFINITY, f64::min),
            max: moods.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });

        let mut categories: BTreeMap<&str, u32> = BTreeMap::new();
        let mut keyword_frequency: BTreeMap<String, u32> = BTreeMap::new();
        for point in &checked {
            if let Some(category) = point.mood_category.as_deref() {
                *categories.entry(category).or_default() += 1;
            }
            for tag in &point.tags {
                *keyword_frequency.entry(tag.clone()).or_default() += 1;
            }
        }

        // Highest count; BTreeMap order makes ties resolve alphabetically
        let most_common_category = categories
            .iter()
            .fold(None, |best: Option<(&str, u32)>, (&name, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((name, count)),
            })
            .map(|(name, _)| name.to_string());

        let days_since_last_checkin = today
            .zip(series.last_checkin_date())
            .map(|(today, last)| (today - last).num_days());

        HistorySummary {
            total_checkins: checked.len() as u32,
            average_mood,
            mood_range,
            most_common_category,
            keyword_frequency,
            days_since_last_checkin,
        }
    }
}
