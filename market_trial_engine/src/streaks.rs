//! Market Trial kernel: streak and combo tracking.

use crate::domain::{Choice, RiskLevel, Streak, StrategyTag, StreakMap};
use crate::metrics::Metric;

/// Threshold an effect must exceed to classify a choice by it.
const DOMINANT_EFFECT_THRESHOLD: f64 = 10.0;

/// Classify a choice into exactly one streak category.
/// First match wins: innovation, aggressive, defensive, ethical, balanced.
pub fn dominant_tag(choice: &Choice) -> StrategyTag {
    let exceeds = |metric: Metric| {
        choice
            .effects
            .get(metric)
            .map_or(false, |v| v > DOMINANT_EFFECT_THRESHOLD)
    };

    if exceeds(Metric::Innovation) {
        StrategyTag::Innovation
    } else if exceeds(Metric::Revenue) {
        StrategyTag::Aggressive
    } else if choice.risk_level == Some(RiskLevel::Low) {
        StrategyTag::Defensive
    } else if exceeds(Metric::Fairness) {
        StrategyTag::Ethical
    } else {
        StrategyTag::Balanced
    }
}

/// Increment the dominant category and reset every other existing one.
/// Categories are created lazily on first use.
pub fn update_streaks(streaks: &StreakMap, choice: &Choice) -> StreakMap {
    let dominant = dominant_tag(choice);
    let mut next = StreakMap::new();

    for tag in StrategyTag::ALL {
        if tag == dominant {
            let count = streaks.get(&tag).map_or(0, |s| s.count) + 1;
            let bonus_applied = streaks.get(&tag).map_or(false, |s| s.bonus_applied);
            next.insert(
                tag,
                Streak {
                    kind: tag,
                    count,
                    bonus_applied,
                },
            );
        } else if streaks.contains_key(&tag) {
            next.insert(tag, Streak::reset(tag));
        }
    }

    next
}

pub fn max_streak(streaks: &StreakMap) -> u32 {
    streaks.values().map(|s| s.count).max().unwrap_or(0)
}

/// Step function of the longest streak.
pub fn combo_multiplier(streaks: &StreakMap) -> f64 {
    multiplier_for_streak(max_streak(streaks))
}

pub fn multiplier_for_streak(count: u32) -> f64 {
    match count {
        c if c >= 5 => 3.0,
        4 => 2.0,
        3 => 1.5,
        2 => 1.2,
        _ => 1.0,
    }
}

/// Display tier for a combo multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTier {
    pub level: u8,
    pub label: &'static str,
}

pub fn combo_tier(multiplier: f64) -> ComboTier {
    let (level, label) = if multiplier >= 3.0 {
        (5, "LEGENDARY COMBO")
    } else if multiplier >= 2.0 {
        (4, "MEGA COMBO")
    } else if multiplier >= 1.5 {
        (3, "SUPER COMBO")
    } else if multiplier >= 1.2 {
        (2, "COMBO")
    } else {
        (1, "NORMAL")
    };
    ComboTier { level, label }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricDelta;

    fn choice(effects: MetricDelta, risk: Option<RiskLevel>) -> Choice {
        Choice {
            id: "c".to_string(),
            title: "c".to_string(),
            description: String::new(),
            effects,
            risk_level: risk,
            tags: Vec::new(),
        }
    }

    #[test]
    fn dominant_tag_priority_order() {
        let both = MetricDelta::new()
            .with(Metric::Innovation, 11.0)
            .with(Metric::Revenue, 20.0);
        assert_eq!(dominant_tag(&choice(both, None)), StrategyTag::Innovation);

        let rev_low = MetricDelta::new().with(Metric::Revenue, 11.0);
        assert_eq!(
            dominant_tag(&choice(rev_low, Some(RiskLevel::Low))),
            StrategyTag::Aggressive
        );

        let fair_low = MetricDelta::new().with(Metric::Fairness, 15.0);
        assert_eq!(
            dominant_tag(&choice(fair_low, Some(RiskLevel::Low))),
            StrategyTag::Defensive
        );
        assert_eq!(dominant_tag(&choice(fair_low, None)), StrategyTag::Ethical);

        let exactly_ten = MetricDelta::new().with(Metric::Innovation, 10.0);
        assert_eq!(dominant_tag(&choice(exactly_ten, None)), StrategyTag::Balanced);
    }

    #[test]
    fn exactly_one_category_grows() {
        let innov = choice(MetricDelta::new().with(Metric::Innovation, 15.0), None);
        let safe = choice(MetricDelta::new(), Some(RiskLevel::Low));

        let s1 = update_streaks(&StreakMap::new(), &innov);
        let s2 = update_streaks(&s1, &innov);
        assert_eq!(s2[&StrategyTag::Innovation].count, 2);
        assert_eq!(s2.len(), 1);

        let s3 = update_streaks(&s2, &safe);
        assert_eq!(s3[&StrategyTag::Defensive].count, 1);
        assert_eq!(s3[&StrategyTag::Innovation].count, 0);
        assert!(!s3[&StrategyTag::Innovation].bonus_applied);
    }

    #[test]
    fn multiplier_table() {
        let expected = [(0, 1.0), (1, 1.0), (2, 1.2), (3, 1.5), (4, 2.0), (5, 3.0), (9, 3.0)];
        for (count, mult) in expected {
            assert_eq!(multiplier_for_streak(count), mult, "count={}", count);
        }
    }

    #[test]
    fn multiplier_is_non_decreasing() {
        let mut prev = 0.0;
        for count in 0..12 {
            let m = multiplier_for_streak(count);
            assert!(m >= prev);
            prev = m;
        }
    }

    #[test]
    fn combo_tiers() {
        assert_eq!(combo_tier(1.0).level, 1);
        assert_eq!(combo_tier(1.2).label, "COMBO");
        assert_eq!(combo_tier(3.0).label, "LEGENDARY COMBO");
    }
}
