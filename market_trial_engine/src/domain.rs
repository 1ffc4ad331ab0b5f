//! Market Trial kernel: core domain types.
//!
//! Pure data. Transition logic lives in `transitions`, scoring rules in
//! their own modules.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metrics::{Metric, MetricDelta, Metrics};
use crate::rules::GameRules;

// ── Enumerations ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SmallBiz,
    Platform,
    Regulator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SmallBiz, Role::Platform, Role::Regulator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SmallBiz => "smallbiz",
            Role::Platform => "platform",
            Role::Regulator => "regulator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Rejection::UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Strategy classification of a choice. Also the streak category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyTag {
    Innovation,
    Aggressive,
    Defensive,
    Ethical,
    Balanced,
}

impl StrategyTag {
    pub const ALL: [StrategyTag; 5] = [
        StrategyTag::Innovation,
        StrategyTag::Aggressive,
        StrategyTag::Defensive,
        StrategyTag::Ethical,
        StrategyTag::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyTag::Innovation => "innovation",
            StrategyTag::Aggressive => "aggressive",
            StrategyTag::Defensive => "defensive",
            StrategyTag::Ethical => "ethical",
            StrategyTag::Balanced => "balanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Positive,
    Negative,
    Neutral,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorType {
    Economist,
    TechExpert,
    PolicyMaker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpType {
    MarketInsight,
    StrategicPause,
    RegulatoryShield,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 3] = [
        PowerUpType::MarketInsight,
        PowerUpType::StrategicPause,
        PowerUpType::RegulatoryShield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpType::MarketInsight => "market_insight",
            PowerUpType::StrategicPause => "strategic_pause",
            PowerUpType::RegulatoryShield => "regulatory_shield",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryBranch {
    Growth,
    Stability,
    Innovation,
    Ethical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

// ── Content types ──────────────────────────────────────────────────

/// A selectable option within a round. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Choice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub effects: MetricDelta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub tags: Vec<StrategyTag>,
}

impl Choice {
    /// Declared tags, or the dominant tag when none were declared.
    pub fn effective_tags(&self) -> Vec<StrategyTag> {
        if self.tags.is_empty() {
            vec![crate::streaks::dominant_tag(self)]
        } else {
            self.tags.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Round {
    pub round_number: u32,
    pub scenario: String,
    pub choices: Vec<Choice>,
}

/// Eligibility predicate for a random event, read against the metrics of
/// the state being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "when")]
pub enum TriggerCondition {
    MetricAtLeast { metric: Metric, value: f64 },
    MetricBelow { metric: Metric, value: f64 },
}

impl TriggerCondition {
    pub fn holds(&self, state: &GameState) -> bool {
        match *self {
            TriggerCondition::MetricAtLeast { metric, value } => state.metrics.get(metric) >= value,
            TriggerCondition::MetricBelow { metric, value } => state.metrics.get(metric) < value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RandomEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: EventKind,
    #[serde(default)]
    pub effects: MetricDelta,
    pub probability: f64,
    /// `None` means every role is eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerCondition>,
}

// ── Per-game records ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MediaHeadline {
    pub round: u32,
    pub headline: String,
    pub sentiment: Sentiment,
    pub reputation_impact: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HistoryEntry {
    pub round: u32,
    pub choice: Choice,
    pub metrics_after: Metrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_triggered: Option<RandomEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_headline: Option<MediaHeadline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Streak {
    pub kind: StrategyTag,
    pub count: u32,
    pub bonus_applied: bool,
}

impl Streak {
    pub fn reset(kind: StrategyTag) -> Self {
        Self {
            kind,
            count: 0,
            bonus_applied: false,
        }
    }
}

pub type StreakMap = BTreeMap<StrategyTag, Streak>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivePowerUps {
    pub market_insight_active: bool,
    pub shield_rounds_left: u32,
    pub time_bonus: u32,
}

// ── Reputation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationRank {
    #[default]
    Unknown,
    Known,
    Respected,
    Legendary,
}

/// Cross-game reputation record, persisted independently of any game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationData {
    pub points: i64,
    pub rank: ReputationRank,
    pub total_games_played: u32,
    pub best_score: i64,
}

// ── Game state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    InProgress,
    GameOver,
}

/// Complete state of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameState {
    pub role: Role,
    pub current_round: u32,
    pub total_rounds: u32,
    pub metrics: Metrics,
    pub history: Vec<HistoryEntry>,
    pub is_game_over: bool,
    pub difficulty: Difficulty,
    pub streaks: StreakMap,
    pub achievements: Vec<String>,
    pub events_history: Vec<RandomEvent>,
    pub combo_multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<MentorType>,
    pub power_ups_used: Vec<PowerUpType>,
    pub active_power_ups: ActivePowerUps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_branch: Option<StoryBranch>,
    pub media_headlines: Vec<MediaHeadline>,
    pub shuffled_rounds: Vec<Round>,
    pub rules: GameRules,
}

impl GameState {
    pub fn phase(&self) -> GamePhase {
        if self.is_game_over {
            GamePhase::GameOver
        } else {
            GamePhase::InProgress
        }
    }

    /// Round the player is currently deciding on.
    pub fn current_round_content(&self) -> Option<&Round> {
        let idx = self.current_round.checked_sub(1)? as usize;
        self.shuffled_rounds.get(idx)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }

    pub fn count_events(&self, kind: EventKind) -> usize {
        self.events_history.iter().filter(|e| e.kind == kind).count()
    }
}

// ── Transition outcomes ────────────────────────────────────────────

/// Why a transition was refused. Refusals never change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotStarted,
    GameOver,
    UnknownRole(String),
    ChoiceNotInRound { choice_id: String, round: u32 },
    PowerUpAlreadyUsed(PowerUpType),
    PowerUpLocked(PowerUpType),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotStarted => write!(f, "no game in progress"),
            Rejection::GameOver => write!(f, "game is already over"),
            Rejection::UnknownRole(role) => write!(f, "unknown role {:?}", role),
            Rejection::ChoiceNotInRound { choice_id, round } => {
                write!(f, "choice {:?} does not belong to round {}", choice_id, round)
            }
            Rejection::PowerUpAlreadyUsed(used) => write!(
                f,
                "only one power-up per game; already used {}",
                used.as_str()
            ),
            Rejection::PowerUpLocked(kind) => {
                write!(f, "power-up {} is not unlocked", kind.as_str())
            }
        }
    }
}

impl std::error::Error for Rejection {}

/// Structured outcome of a committed round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub round: u32,
    pub dominant_tag: StrategyTag,
    pub combo_multiplier: f64,
    pub event: Option<RandomEvent>,
    pub shield_blocked: bool,
    pub headline: MediaHeadline,
    pub story_branch: Option<StoryBranch>,
    pub new_achievements: Vec<String>,
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_ids() {
        assert_eq!("platform".parse::<Role>(), Ok(Role::Platform));
        assert_eq!(
            "monopoly".parse::<Role>(),
            Err(Rejection::UnknownRole("monopoly".to_string()))
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::SmallBiz).unwrap(), "\"smallbiz\"");
        assert_eq!(
            serde_json::to_string(&PowerUpType::RegulatoryShield).unwrap(),
            "\"regulatory_shield\""
        );
    }

    #[test]
    fn untagged_choice_infers_dominant_tag() {
        let choice: Choice = serde_json::from_str(
            r#"{"id":"c","title":"t","effects":{"revenue":12},"riskLevel":"low"}"#,
        )
        .unwrap();
        assert_eq!(choice.effective_tags(), vec![StrategyTag::Aggressive]);
    }

    #[test]
    fn declared_tags_win_over_inference() {
        let choice: Choice = serde_json::from_str(
            r#"{"id":"c","title":"t","effects":{"revenue":12},"tags":["ethical","balanced"]}"#,
        )
        .unwrap();
        assert_eq!(
            choice.effective_tags(),
            vec![StrategyTag::Ethical, StrategyTag::Balanced]
        );
    }

    #[test]
    fn reputation_uses_camel_case_keys() {
        let rep = ReputationData {
            points: 120,
            rank: ReputationRank::Known,
            total_games_played: 3,
            best_score: 71,
        };
        let json = serde_json::to_string(&rep).unwrap();
        assert_eq!(
            json,
            r#"{"points":120,"rank":"known","totalGamesPlayed":3,"bestScore":71}"#
        );
    }
}
