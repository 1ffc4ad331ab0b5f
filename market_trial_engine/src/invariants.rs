//! Market Trial kernel: invariant checks.
//!
//! Hard-fail validation. A violation is a kernel defect, never a player
//! error: `validate_invariants` panics on the first failure. Restoring an
//! untrusted save uses `try_validate_invariants` instead.

use std::collections::BTreeSet;

use crate::domain::GameState;
use crate::events::SHIELD_BLOCK_EVENT_ID;
use crate::rules::MAX_POWER_UPS_PER_GAME;
use crate::streaks::combo_multiplier;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every check. Panics on the first failure.
pub fn validate_invariants(state: &GameState) {
    if let Err(msg) = try_validate_invariants(state) {
        panic!("Invariant violation: {}", msg);
    }
}

/// Non-panicking variant of `validate_invariants`.
/// Returns `Err(message)` on the first failure.
pub fn try_validate_invariants(state: &GameState) -> Result<(), String> {
    check_metric_range(state)?;
    check_power_up_cap(state)?;
    check_round_bounds(state)?;
    check_history_length(state)?;
    check_single_streak_leader(state)?;
    check_combo_matches_streaks(state)?;
    check_unique_achievements(state)?;
    check_events_fire_once(state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_metric_range(state: &GameState) -> Result<(), String> {
    if !state.metrics.all_in_range() {
        return Err(format!(
            "[INVARIANT:metric_range] current metrics out of [0, 100]: {:?}",
            state.metrics
        ));
    }
    for entry in &state.history {
        if !entry.metrics_after.all_in_range() {
            return Err(format!(
                "[INVARIANT:metric_range] round {} recorded metrics out of [0, 100]",
                entry.round
            ));
        }
    }
    Ok(())
}

fn check_power_up_cap(state: &GameState) -> Result<(), String> {
    if state.power_ups_used.len() > MAX_POWER_UPS_PER_GAME {
        return Err(format!(
            "[INVARIANT:power_up_cap] {} power-ups used, limit is {}",
            state.power_ups_used.len(),
            MAX_POWER_UPS_PER_GAME
        ));
    }
    Ok(())
}

fn check_round_bounds(state: &GameState) -> Result<(), String> {
    if state.total_rounds as usize != state.shuffled_rounds.len() {
        return Err(format!(
            "[INVARIANT:round_bounds] total_rounds={} but {} rounds are frozen",
            state.total_rounds,
            state.shuffled_rounds.len()
        ));
    }
    if state.current_round < 1 || state.current_round > state.total_rounds {
        return Err(format!(
            "[INVARIANT:round_bounds] current_round={} outside 1..={}",
            state.current_round, state.total_rounds
        ));
    }
    Ok(())
}

fn check_history_length(state: &GameState) -> Result<(), String> {
    let expected = if state.is_game_over {
        state.total_rounds as usize
    } else {
        state.current_round as usize - 1
    };
    if state.history.len() != expected {
        return Err(format!(
            "[INVARIANT:history_length] expected {} committed rounds, found {}",
            expected,
            state.history.len()
        ));
    }
    Ok(())
}

fn check_single_streak_leader(state: &GameState) -> Result<(), String> {
    let live = state.streaks.values().filter(|s| s.count > 0).count();
    if live > 1 {
        return Err(format!(
            "[INVARIANT:streak_leader] {} streak categories are running at once",
            live
        ));
    }
    Ok(())
}

fn check_combo_matches_streaks(state: &GameState) -> Result<(), String> {
    let expected = combo_multiplier(&state.streaks);
    if state.combo_multiplier != expected {
        return Err(format!(
            "[INVARIANT:combo_consistency] combo {} does not match streaks (expected {})",
            state.combo_multiplier, expected
        ));
    }
    Ok(())
}

fn check_unique_achievements(state: &GameState) -> Result<(), String> {
    let unique: BTreeSet<&str> = state.achievements.iter().map(String::as_str).collect();
    if unique.len() != state.achievements.len() {
        return Err("[INVARIANT:unique_achievements] duplicate achievement ids".to_string());
    }
    Ok(())
}

fn check_events_fire_once(state: &GameState) -> Result<(), String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for event in &state.events_history {
        if event.id == SHIELD_BLOCK_EVENT_ID {
            continue;
        }
        if !seen.insert(event.id.as_str()) {
            return Err(format!(
                "[INVARIANT:event_once] event {:?} fired more than once",
                event.id
            ));
        }
    }
    Ok(())
}
