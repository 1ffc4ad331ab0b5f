//! Market Trial kernel: achievement registry and evaluator.
//!
//! Achievements are static definitions pairing an id with a declarative
//! `Predicate`. Unlocked status lives in `GameState::achievements` and the
//! persisted id list, never on the definition.

use serde::{Deserialize, Serialize};

use crate::domain::{EventKind, GameState, RiskLevel, StrategyTag};
use crate::metrics::Metric;

/// Achievement ids referenced elsewhere in the kernel.
pub mod ids {
    pub const PERFECT_SCORE: &str = "perfect_score";
    pub const HIGH_REVENUE: &str = "high_revenue";
    pub const MARKET_DOMINATOR: &str = "market_dominator";
    pub const INNOVATION_MASTER: &str = "innovation_master";
    pub const TRUSTED_BRAND: &str = "trusted_brand";
    pub const FAIR_PLAY_CHAMPION: &str = "fair_play_champion";
    pub const RISK_TAKER: &str = "risk_taker";
    pub const SAFE_PLAYER: &str = "safe_player";
    pub const INNOVATION_STREAK: &str = "innovation_streak";
    pub const BALANCED_APPROACH: &str = "balanced_approach";
    pub const COMEBACK_KING: &str = "comeback_king";
    pub const EVENT_SURVIVOR: &str = "event_survivor";
    pub const LUCKY_STAR: &str = "lucky_star";
    pub const COMBO_MASTER: &str = "combo_master";
    pub const FIRST_VICTORY: &str = "first_victory";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Condition over a post-transition `GameState`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    AllMetricsAtLeast(f64),
    MetricAtLeast(Metric, f64),
    /// The last `count` choices all carry `risk`.
    RecentChoicesAllRisk { count: usize, risk: RiskLevel },
    /// Game over and every committed choice carries `risk`.
    FinishedWithOnlyRisk(RiskLevel),
    StreakAtLeast(StrategyTag, u32),
    /// Some metric rose by at least this much since the first round.
    /// Needs two committed rounds.
    GainSinceFirstRound(f64),
    EventsAtLeast { kind: EventKind, count: usize },
    FinishedWithEvents { kind: EventKind, count: usize },
    ComboAtLeast(f64),
    GameOver,
}

impl Predicate {
    pub fn holds(&self, state: &GameState) -> bool {
        match *self {
            Predicate::AllMetricsAtLeast(min) => state.metrics.min_value() >= min,
            Predicate::MetricAtLeast(metric, min) => state.metrics.get(metric) >= min,
            Predicate::RecentChoicesAllRisk { count, risk } => {
                state.history.len() >= count
                    && state.history[state.history.len() - count..]
                        .iter()
                        .all(|h| h.choice.risk_level == Some(risk))
            }
            Predicate::FinishedWithOnlyRisk(risk) => {
                state.is_game_over
                    && state
                        .history
                        .iter()
                        .all(|h| h.choice.risk_level == Some(risk))
            }
            Predicate::StreakAtLeast(tag, min) => {
                state.streaks.get(&tag).map_or(false, |s| s.count >= min)
            }
            Predicate::GainSinceFirstRound(gain) => {
                if state.history.len() < 2 {
                    return false;
                }
                let first = &state.history[0].metrics_after;
                Metric::ALL
                    .into_iter()
                    .any(|m| state.metrics.get(m) - first.get(m) >= gain)
            }
            Predicate::EventsAtLeast { kind, count } => state.count_events(kind) >= count,
            Predicate::FinishedWithEvents { kind, count } => {
                state.is_game_over && state.count_events(kind) >= count
            }
            Predicate::ComboAtLeast(min) => state.combo_multiplier >= min,
            Predicate::GameOver => state.is_game_over,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub predicate: Predicate,
}

macro_rules! achievement {
    ($id:expr, $title:expr, $desc:expr, $rarity:ident, $pred:expr) => {
        Achievement {
            id: $id,
            title: $title,
            description: $desc,
            rarity: Rarity::$rarity,
            predicate: $pred,
        }
    };
}

pub static ACHIEVEMENTS: [Achievement; 15] = [
    achievement!(ids::PERFECT_SCORE, "Perfect Score", "Every metric at 80 or above",
        Legendary, Predicate::AllMetricsAtLeast(80.0)),
    achievement!(ids::HIGH_REVENUE, "Tycoon", "Revenue at 90 or above",
        Rare, Predicate::MetricAtLeast(Metric::Revenue, 90.0)),
    achievement!(ids::MARKET_DOMINATOR, "Market Dominator", "Market share at 85 or above",
        Rare, Predicate::MetricAtLeast(Metric::MarketShare, 85.0)),
    achievement!(ids::INNOVATION_MASTER, "Innovation Master", "Innovation at 90 or above",
        Epic, Predicate::MetricAtLeast(Metric::Innovation, 90.0)),
    achievement!(ids::TRUSTED_BRAND, "Trusted Brand", "User trust at 90 or above",
        Epic, Predicate::MetricAtLeast(Metric::UserTrust, 90.0)),
    achievement!(ids::FAIR_PLAY_CHAMPION, "Fair Play Champion", "Fairness at 90 or above",
        Epic, Predicate::MetricAtLeast(Metric::Fairness, 90.0)),
    achievement!(ids::RISK_TAKER, "Risk Taker", "Four high-risk choices in a row",
        Rare, Predicate::RecentChoicesAllRisk { count: 4, risk: RiskLevel::High }),
    achievement!(ids::SAFE_PLAYER, "Safe Player", "Finish a game with only low-risk choices",
        Rare, Predicate::FinishedWithOnlyRisk(RiskLevel::Low)),
    achievement!(ids::INNOVATION_STREAK, "Innovation Streak", "Three innovation rounds in a row",
        Common, Predicate::StreakAtLeast(StrategyTag::Innovation, 3)),
    achievement!(ids::BALANCED_APPROACH, "Balanced Approach", "No metric below 40",
        Rare, Predicate::AllMetricsAtLeast(40.0)),
    achievement!(ids::COMEBACK_KING, "Comeback King", "Raise any metric by 40 after round one",
        Epic, Predicate::GainSinceFirstRound(40.0)),
    achievement!(ids::EVENT_SURVIVOR, "Storm Survivor", "Finish a game after three negative events",
        Epic, Predicate::FinishedWithEvents { kind: EventKind::Negative, count: 3 }),
    achievement!(ids::LUCKY_STAR, "Lucky Star", "Three positive events in one game",
        Rare, Predicate::EventsAtLeast { kind: EventKind::Positive, count: 3 }),
    achievement!(ids::COMBO_MASTER, "Combo Master", "Reach a combo multiplier of 2.0",
        Epic, Predicate::ComboAtLeast(2.0)),
    achievement!(ids::FIRST_VICTORY, "First Victory", "Finish a game with any role",
        Common, Predicate::GameOver),
];

/// Ids not yet in `state.achievements` whose predicate holds, in registry
/// order.
pub fn check_achievements(state: &GameState) -> Vec<String> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !state.has_achievement(a.id))
        .filter(|a| a.predicate.holds(state))
        .map(|a| a.id.to_string())
        .collect()
}

pub fn achievement_by_id(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}
