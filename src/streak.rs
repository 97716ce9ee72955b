//! Check-in streaks
//!
//! Streaks count consecutive calendar days with a check-in. They are computed
//! over the whole history, not the analyzed range: the current streak walks
//! backward from the reference day and the longest streak is the longest run
//! anywhere before it.

use crate::types::{CheckinRecord, StreakSummary};
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;

/// Streak calculator over the distinct check-in days of a history
pub struct StreakCalculator;

impl StreakCalculator {
    /// Compute current and longest streaks.
    ///
    /// With `today`, check-ins after it are ignored and counting starts at
    /// today if it has a check-in, otherwise at yesterday (today's check-in
    /// may still be pending); if neither has one the current streak is 0.
    /// Without `today`, counting starts at the latest check-in.
    pub fn calculate(history: &[CheckinRecord], today: Option<NaiveDate>) -> StreakSummary {
        let days: BTreeSet<NaiveDate> = history
            .iter()
            .map(CheckinRecord::date)
            .filter(|d| today.map_or(true, |t| *d <= t))
            .collect();

        let mut longest = 0u32;
        let mut run = 0u32;
        let mut previous: Option<NaiveDate> = None;
        for &day in &days {
            run = match previous.and_then(|p| p.succ_opt()) {
                Some(next) if next == day => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            previous = Some(day);
        }

        let anchor = match today {
            Some(today) => [Some(today), today.checked_sub_days(Days::new(1))]
                .into_iter()
                .flatten()
                .find(|d| days.contains(d)),
            None => days.last().copied(),
        };

        let (current, current_start) = match anchor {
            Some(end) => {
                let mut start = end;
                let mut count = 1u32;
                while let Some(prev) = start.pred_opt().filter(|p| days.contains(p)) {
                    start = prev;
                    count += 1;
                }
                (count, Some(start))
            }
            None => (0, None),
        };

        let total_checkins = days.len() as u32;
        tracing::debug!(current, longest, total_checkins, "Computed check-in streaks");

        StreakSummary {
            current,
            longest,
            current_start,
            total_checkins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    // Pattern string: 'x' = checked in, '.' = gap; first char is June 1st
    fn history(pattern: &str) -> Vec<CheckinRecord> {
        day(1)
            .iter_days()
            .zip(pattern.chars())
            .filter(|(_, c)| *c == 'x')
            .map(|(date, _)| {
                let timestamp = Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap());
                CheckinRecord::new(timestamp, 6.0)
            })
            .collect()
    }

    #[test]
    fn test_single_checkin() {
        let streak = StreakCalculator::calculate(&history("x"), Some(day(1)));
        assert_eq!(streak.current, 1);
        assert_eq!(streak.longest, 1);
        assert_eq!(streak.current_start, Some(day(1)));
        assert_eq!(streak.total_checkins, 1);
    }

    #[test]
    fn test_no_checkins() {
        let streak = StreakCalculator::calculate(&[], None);
        assert_eq!(streak, StreakSummary::default());
    }

    #[test]
    fn test_current_and_longest() {
        //                                       1234567890
        let streak = StreakCalculator::calculate(&history("xxxx.x.xxx"), Some(day(10)));
        assert_eq!(streak.current, 3);
        assert_eq!(streak.longest, 4);
        assert_eq!(streak.current_start, Some(day(8)));
        assert_eq!(streak.total_checkins, 8);
    }

    #[test]
    fn test_same_day_duplicates_count_once() {
        let mut records = history("xx");
        records.push(records[1].clone());
        let streak = StreakCalculator::calculate(&records, Some(day(2)));
        assert_eq!(streak.current, 2);
        assert_eq!(streak.total_checkins, 2);
    }

    #[test]
    fn test_pending_today_counts_from_yesterday() {
        let streak = StreakCalculator::calculate(&history("..xxx."), Some(day(6)));
        assert_eq!(streak.current, 3);
    }

    #[test]
    fn test_broken_streak_is_zero() {
        let streak = StreakCalculator::calculate(&history("xxx..."), Some(day(6)));
        assert_eq!(streak.current, 0);
        assert_eq!(streak.current_start, None);
        assert_eq!(streak.longest, 3);
    }

    #[test]
    fn test_historical_query_uses_latest_checkin() {
        let streak = StreakCalculator::calculate(&history("x.xx.."), None);
        assert_eq!(streak.current, 2);
        assert_eq!(streak.current_start, Some(day(3)));
    }

    #[test]
    fn test_checkins_after_today_ignored() {
        let streak = StreakCalculator::calculate(&history("xxxxxx"), Some(day(3)));
        assert_eq!(streak.current, 3);
        assert_eq!(streak.longest, 3);
        assert_eq!(streak.total_checkins, 3);
    }

    #[test]
    fn test_streak_spans_months() {
        let pattern = "x".repeat(45);
        let streak = StreakCalculator::calculate(&history(&pattern), Some(day(1) + Days::new(44)));
        assert_eq!(streak.current, 45);
        assert_eq!(streak.longest, 45);
        assert_eq!(streak.current_start, Some(day(1)));
    }
}
