//! Market Trial kernel: tunable game constants.
//!
//! Carried inside every `GameState` so a saved game replays under the
//! rules it was started with.

use serde::{Deserialize, Serialize};

/// Number of power-ups a single game may consume.
pub const MAX_POWER_UPS_PER_GAME: usize = 1;

/// Round after which the story branch is classified.
pub const STORY_BRANCH_ROUND: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameRules {
    pub total_rounds: u32,
    /// Per-round probability that the event resolver runs at all.
    pub event_chance: f64,
    pub shield_rounds: u32,
    pub time_bonus_seconds: u32,
    pub mentor_advice_frequency: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            event_chance: 0.3,
            shield_rounds: 2,
            time_bonus_seconds: 30,
            mentor_advice_frequency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let r = GameRules::default();
        assert_eq!(r.total_rounds, 5);
        assert_eq!(r.event_chance, 0.3);
        assert_eq!(r.shield_rounds, 2);
        assert_eq!(r.time_bonus_seconds, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res = serde_json::from_str::<GameRules>(
            r#"{"totalRounds":5,"eventChance":0.3,"shieldRounds":2,
                "timeBonusSeconds":30,"mentorAdviceFrequency":2,"cheat":true}"#,
        );
        assert!(res.is_err());
    }
}
