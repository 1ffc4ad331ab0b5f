//! Market Trial kernel: metrics model.
//!
//! Six bounded dimensions, the sparse delta type used by choices and
//! events, and the chained cross-effect rules.
//! Every mutation in this module goes through `clamp_metric`.

use serde::{Deserialize, Serialize};

use crate::domain::Difficulty;

pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

/// Clamp a raw value into the metric range `[0, 100]`.
pub fn clamp_metric(value: f64) -> f64 {
    value.clamp(METRIC_MIN, METRIC_MAX)
}

// ── Metric names ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Revenue,
    MarketShare,
    UserTrust,
    Innovation,
    PublicWelfare,
    Fairness,
}

impl Metric {
    /// Declaration order. Iteration over metrics always uses this list.
    pub const ALL: [Metric; 6] = [
        Metric::Revenue,
        Metric::MarketShare,
        Metric::UserTrust,
        Metric::Innovation,
        Metric::PublicWelfare,
        Metric::Fairness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::MarketShare => "marketShare",
            Metric::UserTrust => "userTrust",
            Metric::Innovation => "innovation",
            Metric::PublicWelfare => "publicWelfare",
            Metric::Fairness => "fairness",
        }
    }
}

// ── Metrics record ─────────────────────────────────────────────────

/// The six game metrics, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Metrics {
    pub revenue: f64,
    pub market_share: f64,
    pub user_trust: f64,
    pub innovation: f64,
    pub public_welfare: f64,
    pub fairness: f64,
}

impl Metrics {
    /// Build a record from raw values, clamping each one.
    pub fn new(
        revenue: f64,
        market_share: f64,
        user_trust: f64,
        innovation: f64,
        public_welfare: f64,
        fairness: f64,
    ) -> Self {
        Self {
            revenue: clamp_metric(revenue),
            market_share: clamp_metric(market_share),
            user_trust: clamp_metric(user_trust),
            innovation: clamp_metric(innovation),
            public_welfare: clamp_metric(public_welfare),
            fairness: clamp_metric(fairness),
        }
    }

    /// Every metric set to the same value.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value, value, value)
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::MarketShare => self.market_share,
            Metric::UserTrust => self.user_trust,
            Metric::Innovation => self.innovation,
            Metric::PublicWelfare => self.public_welfare,
            Metric::Fairness => self.fairness,
        }
    }

    fn slot(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::Revenue => &mut self.revenue,
            Metric::MarketShare => &mut self.market_share,
            Metric::UserTrust => &mut self.user_trust,
            Metric::Innovation => &mut self.innovation,
            Metric::PublicWelfare => &mut self.public_welfare,
            Metric::Fairness => &mut self.fairness,
        }
    }

    /// Return a copy with `delta` added to `metric`, clamped.
    pub fn adjusted(&self, metric: Metric, delta: f64) -> Self {
        let mut next = *self;
        let slot = next.slot(metric);
        *slot = clamp_metric(*slot + delta);
        next
    }

    /// Return a copy with every listed delta added (unscaled), clamped.
    pub fn with_delta(&self, delta: &MetricDelta) -> Self {
        delta
            .iter()
            .fold(*self, |acc, (metric, value)| acc.adjusted(metric, value))
    }

    /// Copy with every value pulled back into range. Used on metrics read
    /// from authored content, which bypasses `new`.
    pub fn clamped(&self) -> Self {
        Self::new(
            self.revenue,
            self.market_share,
            self.user_trust,
            self.innovation,
            self.public_welfare,
            self.fairness,
        )
    }

    pub fn values(&self) -> [f64; 6] {
        Metric::ALL.map(|m| self.get(m))
    }

    pub fn min_value(&self) -> f64 {
        self.values().into_iter().fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.values().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn all_in_range(&self) -> bool {
        self.values()
            .iter()
            .all(|v| v.is_finite() && (METRIC_MIN..=METRIC_MAX).contains(v))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

// ── Sparse delta ───────────────────────────────────────────────────

/// Sparse per-metric delta. Only listed metrics change when applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_share: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_trust: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innovation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_welfare: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairness: Option<f64>,
}

impl MetricDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, value);
        self
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Revenue => &mut self.revenue,
            Metric::MarketShare => &mut self.market_share,
            Metric::UserTrust => &mut self.user_trust,
            Metric::Innovation => &mut self.innovation,
            Metric::PublicWelfare => &mut self.public_welfare,
            Metric::Fairness => &mut self.fairness,
        };
        *slot = Some(value);
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::MarketShare => self.market_share,
            Metric::UserTrust => self.user_trust,
            Metric::Innovation => self.innovation,
            Metric::PublicWelfare => self.public_welfare,
            Metric::Fairness => self.fairness,
        }
    }

    /// Listed entries in `Metric::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL
            .into_iter()
            .filter_map(move |m| self.get(m).map(|v| (m, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn has_negative(&self) -> bool {
        self.iter().any(|(_, v)| v < 0.0)
    }
}

// ── Choice application ─────────────────────────────────────────────

/// Scale factor applied to choice effects for each difficulty.
pub fn difficulty_factor(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.2,
        Difficulty::Normal => 1.0,
        Difficulty::Hard => 0.8,
    }
}

/// Apply a choice's effects scaled by combo and difficulty, then the
/// cross-effects.
pub fn apply_choice(
    metrics: &Metrics,
    effects: &MetricDelta,
    combo_multiplier: f64,
    difficulty: Difficulty,
) -> Metrics {
    let factor = difficulty_factor(difficulty);
    let scaled = effects.iter().fold(*metrics, |acc, (metric, effect)| {
        acc.adjusted(metric, effect * combo_multiplier * factor)
    });
    apply_cross_effects(&scaled)
}

// ── Cross-effects ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Above,
    Below,
}

/// `if trigger <cmp> threshold { target += delta }`
#[derive(Debug, Clone, Copy)]
pub struct CrossEffect {
    pub trigger: Metric,
    pub comparison: Comparison,
    pub threshold: f64,
    pub target: Metric,
    pub delta: f64,
}

impl CrossEffect {
    fn fires(&self, metrics: &Metrics) -> bool {
        let value = metrics.get(self.trigger);
        match self.comparison {
            Comparison::Above => value > self.threshold,
            Comparison::Below => value < self.threshold,
        }
    }
}

/// Chained rules, evaluated in this order. Each reads the values left by
/// the previous one.
pub const CROSS_EFFECTS: [CrossEffect; 5] = [
    CrossEffect {
        trigger: Metric::Revenue,
        comparison: Comparison::Above,
        threshold: 85.0,
        target: Metric::Fairness,
        delta: -3.0,
    },
    CrossEffect {
        trigger: Metric::Innovation,
        comparison: Comparison::Above,
        threshold: 80.0,
        target: Metric::Revenue,
        delta: 2.0,
    },
    CrossEffect {
        trigger: Metric::UserTrust,
        comparison: Comparison::Above,
        threshold: 80.0,
        target: Metric::Revenue,
        delta: 3.0,
    },
    CrossEffect {
        trigger: Metric::Fairness,
        comparison: Comparison::Below,
        threshold: 40.0,
        target: Metric::PublicWelfare,
        delta: -2.0,
    },
    CrossEffect {
        trigger: Metric::PublicWelfare,
        comparison: Comparison::Above,
        threshold: 75.0,
        target: Metric::UserTrust,
        delta: 2.0,
    },
];

/// Apply `CROSS_EFFECTS` once, in order.
pub fn apply_cross_effects(metrics: &Metrics) -> Metrics {
    CROSS_EFFECTS.iter().fold(*metrics, |acc, rule| {
        if rule.fires(&acc) {
            acc.adjusted(rule.target, rule.delta)
        } else {
            acc
        }
    })
}
