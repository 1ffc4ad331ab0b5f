//! Market Trial kernel: random event resolver.
//!
//! A round first passes a gate (`GameRules::event_chance`), then draws one
//! event by cumulative probability over the eligible catalog entries in
//! declaration order. Gate and draw consume independent random values.

use crate::domain::{EventKind, GameState, RandomEvent};
use crate::metrics::{MetricDelta, Metrics};
use crate::random::RandomSource;

/// Id of the notification recorded when a shield blocks an event.
pub const SHIELD_BLOCK_EVENT_ID: &str = "shield_block";

/// What the resolver did this round.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResolution {
    /// Gate failed, nothing eligible, or the draw overshot the total weight.
    Quiet,
    Applied(RandomEvent),
    /// A negative event was drawn while the shield was up.
    Blocked {
        blocked: RandomEvent,
        notice: RandomEvent,
    },
}

impl EventResolution {
    /// The event recorded in history and `events_history`.
    pub fn recorded(&self) -> Option<&RandomEvent> {
        match self {
            EventResolution::Quiet => None,
            EventResolution::Applied(event) => Some(event),
            EventResolution::Blocked { notice, .. } => Some(notice),
        }
    }

    pub fn was_blocked(&self) -> bool {
        matches!(self, EventResolution::Blocked { .. })
    }
}

/// Events matching the role, whose trigger holds against `state`, and that
/// have not fired earlier in this game.
pub fn eligible_events<'a>(catalog: &'a [RandomEvent], state: &GameState) -> Vec<&'a RandomEvent> {
    catalog
        .iter()
        .filter(|event| {
            event
                .roles
                .as_ref()
                .map_or(true, |roles| roles.contains(&state.role))
        })
        .filter(|event| event.trigger.map_or(true, |t| t.holds(state)))
        .filter(|event| !state.events_history.iter().any(|e| e.id == event.id))
        .collect()
}

/// First event whose cumulative probability exceeds `roll`.
/// `None` when `roll` is at or beyond the total weight.
pub fn draw_event<'a>(eligible: &[&'a RandomEvent], roll: f64) -> Option<&'a RandomEvent> {
    let mut cumulative = 0.0;
    for event in eligible {
        cumulative += event.probability;
        if roll < cumulative {
            return Some(*event);
        }
    }
    None
}

/// Gate, then weighted draw. The draw only consumes a random value when
/// something is eligible.
pub fn roll_event(
    state: &GameState,
    catalog: &[RandomEvent],
    rng: &mut dyn RandomSource,
) -> Option<RandomEvent> {
    if rng.next_f64() >= state.rules.event_chance {
        return None;
    }
    let eligible = eligible_events(catalog, state);
    if eligible.is_empty() {
        log::debug!("event gate passed but no event is eligible");
        return None;
    }
    let roll = rng.next_f64();
    let drawn = draw_event(&eligible, roll).cloned();
    match &drawn {
        Some(event) => log::debug!("event drawn: {} (roll {:.3})", event.id, roll),
        None => log::debug!("event roll {:.3} exceeded cumulative weight", roll),
    }
    drawn
}

/// Zero-effect notification standing in for a blocked event.
pub fn shield_block_event(blocked: &RandomEvent) -> RandomEvent {
    RandomEvent {
        id: SHIELD_BLOCK_EVENT_ID.to_string(),
        title: "Regulatory shield".to_string(),
        description: format!("The shield absorbed \"{}\".", blocked.title),
        kind: EventKind::Positive,
        effects: MetricDelta::new(),
        probability: 1.0,
        roles: None,
        trigger: None,
    }
}

/// Roll for an event against `state` and decide whether the shield absorbs
/// it. `shield_up` must reflect the shield at the start of the transition.
pub fn resolve(
    state: &GameState,
    catalog: &[RandomEvent],
    shield_up: bool,
    rng: &mut dyn RandomSource,
) -> EventResolution {
    match roll_event(state, catalog, rng) {
        None => EventResolution::Quiet,
        Some(event) if shield_up && event.effects.has_negative() => {
            log::debug!("shield blocked event {}", event.id);
            let notice = shield_block_event(&event);
            EventResolution::Blocked {
                blocked: event,
                notice,
            }
        }
        Some(event) => EventResolution::Applied(event),
    }
}

/// Event deltas are applied unscaled, clamped per metric.
pub fn apply_event_effects(metrics: &Metrics, event: &RandomEvent) -> Metrics {
    metrics.with_delta(&event.effects)
}
