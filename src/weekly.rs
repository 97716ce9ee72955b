//! Weekly pattern analysis
//!
//! Groups available mood values by ISO weekday and picks the best and worst
//! day by mean. Ties go to the earliest weekday (Monday first) for both best
//! and worst; the tie-break is arbitrary but fixed.

use crate::types::{DayOfWeek, PatternStatus, TimeSeries, WeekdayAverage, WeeklyPattern};
use chrono::Datelike;

/// Distinct weekdays with observations needed to resolve a pattern
const MIN_DISTINCT_WEEKDAYS: usize = 2;

/// Weekly pattern analyzer
pub struct WeeklyPatternAnalyzer;

impl WeeklyPatternAnalyzer {
    /// Compute per-weekday mood averages and the best/worst day
    pub fn analyze(series: &TimeSeries) -> WeeklyPattern {
        let mut sums = [0.0_f64; 7];
        let mut counts = [0_usize; 7];

        for point in &series.points {
            if let Some(mood) = point.mood {
                let day = DayOfWeek::from(point.date.weekday());
                let idx = (day.iso_index() - 1) as usize;
                sums[idx] += mood;
                counts[idx] += 1;
            }
        }

        let averages: Vec<WeekdayAverage> = DayOfWeek::ALL
            .iter()
            .enumerate()
            .filter(|(idx, _)| counts[*idx] > 0)
            .map(|(idx, day)| WeekdayAverage {
                day: *day,
                average: sums[idx] / counts[idx] as f64,
                count: counts[idx],
            })
            .collect();

        if averages.len() < MIN_DISTINCT_WEEKDAYS {
            return WeeklyPattern {
                status: PatternStatus::InsufficientData,
                best_day: None,
                worst_day: None,
                averages,
            };
        }

        // Strict comparisons keep the earliest weekday on ties
        let mut best = &averages[0];
        let mut worst = &averages[0];
        for entry in &averages[1..] {
            if entry.average > best.average {
                best = entry;
            }
            if entry.average < worst.average {
                worst = entry;
            }
        }

        WeeklyPattern {
            status: PatternStatus::Resolved,
            best_day: Some(best.day),
            worst_day: Some(worst.day),
            averages,
        }
    }
}
