//! Market Trial kernel: centralized transition logic.
//!
//! All state mutation lives here. Each transition clones the incoming state,
//! mutates the clone and returns it; the input is never touched, so a
//! rejected transition leaves the caller's state exactly as it was.

use crate::achievements::check_achievements;
use crate::content::ContentCatalog;
use crate::domain::{GameState, HistoryEntry, PowerUpType, Rejection, RoundOutcome};
use crate::events::{self, EventResolution};
use crate::media::HeadlineGenerator;
use crate::metrics::apply_choice;
use crate::power_ups::{self, is_power_up_unlocked};
use crate::random::RandomSource;
use crate::rules::STORY_BRANCH_ROUND;
use crate::story::classify_branch;
use crate::streaks::{combo_multiplier, dominant_tag, update_streaks};

/// Read-only collaborators a transition consults.
#[derive(Clone, Copy)]
pub struct TransitionContext<'a> {
    pub catalog: &'a ContentCatalog,
    pub headlines: &'a dyn HeadlineGenerator,
}

// ---------------------------------------------------------------------------
// Round transition
// ---------------------------------------------------------------------------

/// Commit one round for `choice_id`, which must belong to the current round.
///
/// Order: streaks, combo, metrics (effects then cross-effects), event roll
/// and resolution, headline, story branch (leaving round 2 only), power-up
/// decay, round advance or game over, achievement scan.
///
/// Random draws, in order: event gate, event draw (only when something is
/// eligible), headline pick.
pub fn make_choice(
    state: &GameState,
    choice_id: &str,
    ctx: TransitionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Result<(GameState, RoundOutcome), Rejection> {
    if state.is_game_over {
        return Err(Rejection::GameOver);
    }
    let round = state.current_round;
    let choice = state
        .current_round_content()
        .and_then(|r| r.choices.iter().find(|c| c.id == choice_id))
        .cloned()
        .ok_or_else(|| Rejection::ChoiceNotInRound {
            choice_id: choice_id.to_string(),
            round,
        })?;

    // Shield status is read before anything in this round changes.
    let shield_up = state.active_power_ups.shield_rounds_left > 0;

    let streaks = update_streaks(&state.streaks, &choice);
    let combo = combo_multiplier(&streaks);
    let mut metrics = apply_choice(&state.metrics, &choice.effects, combo, state.difficulty);

    // Events see the post-choice metrics and streaks, but the event history
    // from before this round.
    let probe = GameState {
        metrics,
        streaks: streaks.clone(),
        combo_multiplier: combo,
        ..state.clone()
    };
    let resolution = events::resolve(&probe, &ctx.catalog.events, shield_up, rng);
    if let EventResolution::Applied(event) = &resolution {
        metrics = events::apply_event_effects(&metrics, event);
    }
    let recorded = resolution.recorded().cloned();

    let headline = ctx
        .headlines
        .generate(state.role, round, &choice, &metrics, rng);

    let mut next = probe;
    next.metrics = metrics;
    next.history.push(HistoryEntry {
        round,
        choice: choice.clone(),
        metrics_after: metrics,
        event_triggered: recorded.clone(),
        media_headline: Some(headline.clone()),
    });
    if let Some(event) = &recorded {
        next.events_history.push(event.clone());
    }
    next.media_headlines.push(headline.clone());

    if round == STORY_BRANCH_ROUND && next.story_branch.is_none() {
        let branch = classify_branch(&next.history);
        log::info!("story branch set to {:?}", branch);
        next.story_branch = Some(branch);
    }

    next.active_power_ups = power_ups::decay(&state.active_power_ups);

    let game_over = round >= state.total_rounds;
    if game_over {
        next.is_game_over = true;
    } else {
        next.current_round = round + 1;
    }

    let new_achievements = check_achievements(&next);
    next.achievements.extend(new_achievements.iter().cloned());

    let outcome = RoundOutcome {
        round,
        dominant_tag: dominant_tag(&choice),
        combo_multiplier: combo,
        event: recorded,
        shield_blocked: resolution.was_blocked(),
        headline,
        story_branch: next.story_branch,
        new_achievements,
        game_over,
    };
    Ok((next, outcome))
}

// ---------------------------------------------------------------------------
// Power-up transition
// ---------------------------------------------------------------------------

/// Activate `kind`. At most one power-up per game, checked before anything
/// else; the power-up must also be unlocked by an achievement.
pub fn use_power_up(
    state: &GameState,
    kind: PowerUpType,
    catalog: &ContentCatalog,
) -> Result<GameState, Rejection> {
    if state.is_game_over {
        return Err(Rejection::GameOver);
    }
    if let Some(used) = state.power_ups_used.first() {
        return Err(Rejection::PowerUpAlreadyUsed(*used));
    }
    if !is_power_up_unlocked(kind, &state.achievements) {
        return Err(Rejection::PowerUpLocked(kind));
    }

    let primary = catalog
        .role(state.role)
        .map(|r| r.primary_metrics.as_slice())
        .unwrap_or(&[]);

    let mut next = state.clone();
    power_ups::activate(&mut next, kind, primary);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventKind, RandomEvent, Role, StrategyTag};
    use crate::events::SHIELD_BLOCK_EVENT_ID;
    use crate::media::TemplateHeadlines;
    use crate::metrics::{Metric, MetricDelta};
    use crate::random::ScriptedRandom;
    use crate::state::start_game;

    fn new_game(catalog: &ContentCatalog, role: Role) -> GameState {
        start_game(catalog, role, Default::default(), None, &mut ScriptedRandom::constant(0.0))
            .unwrap()
    }

    fn first_choice(state: &GameState) -> String {
        state.current_round_content().unwrap().choices[0].id.clone()
    }

    #[test]
    fn rejected_choice_leaves_state_alone() {
        let catalog = ContentCatalog::builtin();
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let state = new_game(&catalog, Role::Platform);
        let before = state.clone();
        let err = make_choice(&state, "nope", ctx, &mut ScriptedRandom::constant(0.9)).unwrap_err();
        assert_eq!(
            err,
            Rejection::ChoiceNotInRound { choice_id: "nope".to_string(), round: 1 }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn round_advances_and_records_history() {
        let catalog = ContentCatalog::builtin();
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let state = new_game(&catalog, Role::SmallBiz);
        let id = first_choice(&state);
        let (next, outcome) =
            make_choice(&state, &id, ctx, &mut ScriptedRandom::constant(0.9)).unwrap();
        assert_eq!(next.current_round, 2);
        assert_eq!(next.history.len(), 1);
        assert_eq!(next.media_headlines.len(), 1);
        assert_eq!(outcome.round, 1);
        assert!(outcome.event.is_none());
        assert_eq!(next.shuffled_rounds, state.shuffled_rounds);
    }

    #[test]
    fn last_round_sets_game_over_without_advancing() {
        let catalog = ContentCatalog::builtin();
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let mut state = new_game(&catalog, Role::Regulator);
        let mut rng = ScriptedRandom::constant(0.9);
        for _ in 0..5 {
            let id = first_choice(&state);
            state = make_choice(&state, &id, ctx, &mut rng).unwrap().0;
        }
        assert!(state.is_game_over);
        assert_eq!(state.current_round, 5);
        assert!(state.has_achievement("first_victory"));
        assert_eq!(
            make_choice(&state, "x", ctx, &mut rng).unwrap_err(),
            Rejection::GameOver
        );
    }

    #[test]
    fn story_branch_is_set_leaving_round_two() {
        let catalog = ContentCatalog::builtin();
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let mut state = new_game(&catalog, Role::SmallBiz);
        let mut rng = ScriptedRandom::constant(0.9);
        let id = first_choice(&state);
        state = make_choice(&state, &id, ctx, &mut rng).unwrap().0;
        assert!(state.story_branch.is_none());
        let id = first_choice(&state);
        let (state, outcome) = make_choice(&state, &id, ctx, &mut rng).unwrap();
        assert!(state.story_branch.is_some());
        assert_eq!(outcome.story_branch, state.story_branch);
    }

    #[test]
    fn shield_turns_negative_event_into_notice() {
        let mut catalog = ContentCatalog::builtin();
        catalog.events = vec![RandomEvent {
            id: "crash".to_string(),
            title: "Crash".to_string(),
            description: String::new(),
            kind: EventKind::Negative,
            effects: MetricDelta::new().with(Metric::Revenue, -20.0),
            probability: 1.0,
            roles: None,
            trigger: None,
        }];
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let mut state = new_game(&catalog, Role::Platform);
        state.active_power_ups.shield_rounds_left = 2;

        let id = first_choice(&state);
        let (next, outcome) =
            make_choice(&state, &id, ctx, &mut ScriptedRandom::constant(0.0)).unwrap();
        assert!(outcome.shield_blocked);
        let recorded = next.history[0].event_triggered.as_ref().unwrap();
        assert_eq!(recorded.id, SHIELD_BLOCK_EVENT_ID);
        assert!(recorded.effects.is_empty());
        assert_eq!(next.events_history.len(), 1);
        assert_eq!(next.active_power_ups.shield_rounds_left, 1);
    }

    #[test]
    fn power_up_requires_unlock_and_is_single_use() {
        let catalog = ContentCatalog::builtin();
        let mut state = new_game(&catalog, Role::Regulator);
        assert_eq!(
            use_power_up(&state, PowerUpType::RegulatoryShield, &catalog).unwrap_err(),
            Rejection::PowerUpLocked(PowerUpType::RegulatoryShield)
        );

        state.achievements = vec!["combo_master".to_string(), "first_victory".to_string()];
        let shielded = use_power_up(&state, PowerUpType::RegulatoryShield, &catalog).unwrap();
        assert_eq!(shielded.active_power_ups.shield_rounds_left, 2);
        assert_eq!(shielded.metrics.fairness, state.metrics.fairness + 8.0);

        let again = use_power_up(&shielded, PowerUpType::MarketInsight, &catalog);
        assert_eq!(
            again.unwrap_err(),
            Rejection::PowerUpAlreadyUsed(PowerUpType::RegulatoryShield)
        );
        assert_eq!(shielded.power_ups_used.len(), 1);
    }

    #[test]
    fn market_insight_boosts_primary_metrics_and_clears_next_round() {
        let catalog = ContentCatalog::builtin();
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let mut state = new_game(&catalog, Role::SmallBiz);
        state.achievements.push("first_victory".to_string());
        let boosted = use_power_up(&state, PowerUpType::MarketInsight, &catalog).unwrap();
        assert!(boosted.active_power_ups.market_insight_active);
        assert_eq!(boosted.metrics.revenue, state.metrics.revenue + 3.0);
        assert_eq!(boosted.metrics.user_trust, state.metrics.user_trust);

        let id = first_choice(&boosted);
        let (next, _) = make_choice(&boosted, &id, ctx, &mut ScriptedRandom::constant(0.9)).unwrap();
        assert!(!next.active_power_ups.market_insight_active);
    }

    #[test]
    fn outcome_reports_dominant_tag() {
        let catalog = ContentCatalog::builtin();
        let ctx = TransitionContext { catalog: &catalog, headlines: &TemplateHeadlines };
        let state = new_game(&catalog, Role::Platform);
        let choice = state.current_round_content().unwrap().choices[0].clone();
        let (_, outcome) =
            make_choice(&state, &choice.id, ctx, &mut ScriptedRandom::constant(0.9)).unwrap();
        assert_eq!(outcome.dominant_tag, dominant_tag(&choice));
        assert!(StrategyTag::ALL.contains(&outcome.dominant_tag));
    }
}
