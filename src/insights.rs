//! Insight generation
//!
//! A fixed, ordered list of rules turns analyzer outputs into short statements.
//! Every rule is evaluated independently; output order follows rule order,
//! never statistical strength, and is capped at `max_insights`. A rule whose
//! inputs are unresolved simply does not fire.

use crate::config::AnalyticsConfig;
use crate::correlation::{CorrelationEngine, FactorCorrelation};
use crate::types::{
    DayOfWeek, Factor, Insight, InsightImpact, InsightKind, Metric, MetricTrend, StreakSummary,
    TrendDirection, VarianceReading, WeeklyPattern,
};
use crate::variance::VarianceAnalyzer;
use std::collections::BTreeMap;

/// Analyzer outputs the rules read from
#[derive(Debug, Clone, Copy)]
pub struct InsightInputs<'a> {
    pub trends: &'a BTreeMap<Metric, MetricTrend>,
    pub variance: &'a BTreeMap<Metric, VarianceReading>,
    pub correlations: &'a [FactorCorrelation],
    pub weekly_pattern: &'a WeeklyPattern,
    pub streak: &'a StreakSummary,
    pub synthetic: bool,
}

/// Insight rules in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightRule {
    MoodTrend,
    Stability,
    StrongestCorrelation,
    WeeklyPattern,
    StreakEncouragement,
}

impl InsightRule {
    /// Evaluation order
    pub const ORDERED: [InsightRule; 5] = [
        InsightRule::MoodTrend,
        InsightRule::Stability,
        InsightRule::StrongestCorrelation,
        InsightRule::WeeklyPattern,
        InsightRule::StreakEncouragement,
    ];

    /// Evaluate the rule; None when it does not fire
    pub fn evaluate(&self, inputs: &InsightInputs<'_>, config: &AnalyticsConfig) -> Option<Insight> {
        match self {
            InsightRule::MoodTrend => mood_trend(inputs, config),
            InsightRule::Stability => stability(inputs, config),
            InsightRule::StrongestCorrelation => strongest_correlation(inputs, config),
            InsightRule::WeeklyPattern => weekly_pattern(inputs),
            InsightRule::StreakEncouragement => streak_encouragement(inputs, config),
        }
    }
}

/// Insight generator applying the ordered rule list
pub struct InsightGenerator;

impl InsightGenerator {
    /// Generate insights. Placeholder data never produces insights.
    pub fn generate(inputs: &InsightInputs<'_>, config: &AnalyticsConfig) -> Vec<Insight> {
        if inputs.synthetic {
            tracing::debug!("Skipping insights for synthetic series");
            return Vec::new();
        }

        let insights: Vec<Insight> = InsightRule::ORDERED
            .iter()
            .filter_map(|rule| rule.evaluate(inputs, config))
            .take(config.max_insights)
            .collect();

        tracing::debug!(count = insights.len(), "Generated insights");
        insights
    }
}

fn mood_trend(inputs: &InsightInputs<'_>, config: &AnalyticsConfig) -> Option<Insight> {
    let trend = inputs.trends.get(&Metric::Mood)?;
    let days = config.trend_window_size;

    match trend.direction {
        TrendDirection::Improving => Some(Insight {
            kind: InsightKind::Trend,
            title: "Your mood is improving".to_string(),
            description: format!(
                "Your average mood over the last {days} days is {:.1}% higher than the {days} days before.",
                trend.percent_change
            ),
            impact: InsightImpact::Positive,
        }),
        TrendDirection::Declining => Some(Insight {
            kind: InsightKind::Trend,
            title: "Your mood has dipped".to_string(),
            description: format!(
                "Your average mood over the last {days} days is {:.1}% lower than the {days} days before.",
                trend.percent_change.abs()
            ),
            impact: InsightImpact::Negative,
        }),
        TrendDirection::Stable => None,
    }
}

fn stability(inputs: &InsightInputs<'_>, config: &AnalyticsConfig) -> Option<Insight> {
    let reading = inputs.variance.get(&Metric::Mood)?;
    if !VarianceAnalyzer::is_stable(reading, config) {
        return None;
    }

    Some(Insight {
        kind: InsightKind::Stability,
        title: "Your mood is steady".to_string(),
        description: format!(
            "Your mood has stayed consistent across your last {} check-ins (variance {:.2}).",
            reading.sample_size, reading.variance
        ),
        impact: InsightImpact::Positive,
    })
}

fn strongest_correlation(inputs: &InsightInputs<'_>, config: &AnalyticsConfig) -> Option<Insight> {
    let best =
        CorrelationEngine::strongest(inputs.correlations, config.correlation_insight_threshold)?;
    let r = best.coefficient;
    let positive = r > 0.0;

    let (title, description) = match (&best.factor, positive) {
        (Factor::Metric(metric), true) => (
            format!("Your mood improves with {}", metric.label()),
            format!(
                "On days with higher {}, your mood tends to be higher too (r = {r:.2}).",
                metric.label()
            ),
        ),
        (Factor::Metric(metric), false) => (
            format!("Higher {} is linked to lower mood", metric.label()),
            format!(
                "On days with higher {}, your mood tends to be lower (r = {r:.2}).",
                metric.label()
            ),
        ),
        (Factor::Tag(tag), true) => (
            format!("Your mood improves with {tag}"),
            format!("Your mood tends to be higher on days tagged \"{tag}\" (r = {r:.2})."),
        ),
        (Factor::Tag(tag), false) => (
            format!("\"{tag}\" days are linked to lower mood"),
            format!("Your mood tends to be lower on days tagged \"{tag}\" (r = {r:.2})."),
        ),
    };

    Some(Insight {
        kind: InsightKind::Correlation,
        title,
        description,
        impact: if positive {
            InsightImpact::Positive
        } else {
            InsightImpact::Negative
        },
    })
}

fn weekly_pattern(inputs: &InsightInputs<'_>) -> Option<Insight> {
    let pattern = inputs.weekly_pattern;
    let best = pattern.best_day?;
    let worst = pattern.worst_day?;
    let average_of = |day: DayOfWeek| {
        pattern
            .averages
            .iter()
            .find(|a| a.day == day)
            .map_or(0.0, |a| a.average)
    };

    let (title, description) = if best == worst {
        (
            "Your mood is even across the week".to_string(),
            format!(
                "No weekday stands out: {} is both your best and worst day (avg {:.1}).",
                best.name(),
                average_of(best)
            ),
        )
    } else {
        (
            format!("{} is your best day", best.name()),
            format!(
                "Your mood tends to peak on {}s (avg {:.1}) and dip on {}s (avg {:.1}).",
                best.name(),
                average_of(best),
                worst.name(),
                average_of(worst)
            ),
        )
    };

    Some(Insight {
        kind: InsightKind::WeeklyPattern,
        title,
        description,
        impact: InsightImpact::Neutral,
    })
}

fn streak_encouragement(inputs: &InsightInputs<'_>, config: &AnalyticsConfig) -> Option<Insight> {
    let current = inputs.streak.current;
    if current < config.streak_insight_min_days {
        return None;
    }

    Some(Insight {
        kind: InsightKind::Streak,
        title: format!("{current}-day check-in streak"),
        description: format!("You've checked in {current} days in a row. Keep it going!"),
        impact: InsightImpact::Positive,
    })
}
