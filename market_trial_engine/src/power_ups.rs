//! Market Trial kernel: power-up catalog and effects.
//!
//! A power-up is unlocked by an achievement and may be used once per game.
//! Activation grants an immediate metric bonus and sets a flag on
//! `ActivePowerUps` that decays at the end of each committed round.

use crate::achievements::ids as achievement_ids;
use crate::domain::{ActivePowerUps, GameState, PowerUpType};
use crate::metrics::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpSpec {
    pub kind: PowerUpType,
    pub name: &'static str,
    pub description: &'static str,
    /// Advertised final-score penalty, in percent.
    pub cost: u32,
    pub usage_limit: u32,
    /// Achievement id that unlocks this power-up.
    pub unlock_requirement: &'static str,
}

pub static POWER_UPS: [PowerUpSpec; 3] = [
    PowerUpSpec {
        kind: PowerUpType::MarketInsight,
        name: "Market Insight",
        description: "Reveal the impact of every option this round. +3 to each primary metric.",
        cost: 5,
        usage_limit: 1,
        unlock_requirement: achievement_ids::FIRST_VICTORY,
    },
    PowerUpSpec {
        kind: PowerUpType::StrategicPause,
        name: "Strategic Pause",
        description: "Freeze the clock for 30 extra seconds. +5 to every metric.",
        cost: 3,
        usage_limit: 1,
        unlock_requirement: achievement_ids::BALANCED_APPROACH,
    },
    PowerUpSpec {
        kind: PowerUpType::RegulatoryShield,
        name: "Regulatory Shield",
        description: "Block negative random events for the next two rounds. +8 fairness, +5 public welfare.",
        cost: 7,
        usage_limit: 1,
        unlock_requirement: achievement_ids::COMBO_MASTER,
    },
];

const MARKET_INSIGHT_BONUS: f64 = 3.0;
const STRATEGIC_PAUSE_BONUS: f64 = 5.0;
const SHIELD_FAIRNESS_BONUS: f64 = 8.0;
const SHIELD_WELFARE_BONUS: f64 = 5.0;

pub fn power_up_spec(kind: PowerUpType) -> &'static PowerUpSpec {
    match kind {
        PowerUpType::MarketInsight => &POWER_UPS[0],
        PowerUpType::StrategicPause => &POWER_UPS[1],
        PowerUpType::RegulatoryShield => &POWER_UPS[2],
    }
}

pub fn is_power_up_unlocked(kind: PowerUpType, achievements: &[String]) -> bool {
    let required = power_up_spec(kind).unlock_requirement;
    achievements.iter().any(|a| a == required)
}

/// Power-ups unlocked by `achievements`, in catalog order.
pub fn available_power_ups(achievements: &[String]) -> Vec<PowerUpType> {
    PowerUpType::ALL
        .into_iter()
        .filter(|kind| is_power_up_unlocked(*kind, achievements))
        .collect()
}

/// Apply the activation effects of `kind` to `state` in place.
/// Usage and unlock checks belong to the caller.
pub fn activate(state: &mut GameState, kind: PowerUpType, primary_metrics: &[Metric]) {
    match kind {
        PowerUpType::MarketInsight => {
            state.active_power_ups.market_insight_active = true;
            for metric in primary_metrics {
                state.metrics = state.metrics.adjusted(*metric, MARKET_INSIGHT_BONUS);
            }
        }
        PowerUpType::StrategicPause => {
            state.active_power_ups.time_bonus = state.rules.time_bonus_seconds;
            for metric in Metric::ALL {
                state.metrics = state.metrics.adjusted(metric, STRATEGIC_PAUSE_BONUS);
            }
        }
        PowerUpType::RegulatoryShield => {
            state.active_power_ups.shield_rounds_left = state.rules.shield_rounds;
            state.metrics = state
                .metrics
                .adjusted(Metric::Fairness, SHIELD_FAIRNESS_BONUS)
                .adjusted(Metric::PublicWelfare, SHIELD_WELFARE_BONUS);
        }
    }
    state.power_ups_used.push(kind);
}

/// End-of-round decay: insight and time bonus clear, shield counts down.
pub fn decay(active: &ActivePowerUps) -> ActivePowerUps {
    ActivePowerUps {
        market_insight_active: false,
        shield_rounds_left: active.shield_rounds_left.saturating_sub(1),
        time_bonus: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unlock_follows_requirement() {
        let earned = ids(&["first_victory", "lucky_star"]);
        assert!(is_power_up_unlocked(PowerUpType::MarketInsight, &earned));
        assert!(!is_power_up_unlocked(PowerUpType::RegulatoryShield, &earned));
        assert_eq!(available_power_ups(&earned), vec![PowerUpType::MarketInsight]);
    }

    #[test]
    fn everything_unlocked_keeps_catalog_order() {
        let earned = ids(&["combo_master", "balanced_approach", "first_victory"]);
        assert_eq!(available_power_ups(&earned), PowerUpType::ALL.to_vec());
        assert!(available_power_ups(&[]).is_empty());
    }

    #[test]
    fn decay_floors_at_zero() {
        let active = ActivePowerUps {
            market_insight_active: true,
            shield_rounds_left: 1,
            time_bonus: 30,
        };
        let once = decay(&active);
        assert_eq!(once.shield_rounds_left, 0);
        assert!(!once.market_insight_active);
        assert_eq!(once.time_bonus, 0);
        assert_eq!(decay(&once).shield_rounds_left, 0);
    }

    #[test]
    fn spec_lookup_matches_kind() {
        for kind in PowerUpType::ALL {
            assert_eq!(power_up_spec(kind).kind, kind);
            assert_eq!(power_up_spec(kind).usage_limit, 1);
        }
    }
}
