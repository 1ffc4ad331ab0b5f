//! Market Trial kernel: engine.
//!
//! Top-level orchestrator. Holds at most one game, delegates mutation to
//! `transitions` and validates invariants after every committed change.

use crate::content::ContentCatalog;
use crate::domain::{Choice, GamePhase, GameState, PowerUpType, Rejection, RoundOutcome};
use crate::invariants::{try_validate_invariants, validate_invariants};
use crate::media::{HeadlineGenerator, TemplateHeadlines};
use crate::random::RandomSource;
use crate::state::{create_initial_state, GameSetup};
use crate::transitions::{self, TransitionContext};

/// Stateful engine wrapping the pure transition layer.
pub struct GameEngine {
    catalog: ContentCatalog,
    headlines: Box<dyn HeadlineGenerator>,
    state: Option<GameState>,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(ContentCatalog::builtin())
    }
}

impl GameEngine {
    pub fn new(catalog: ContentCatalog) -> Self {
        Self::with_headlines(catalog, Box::new(TemplateHeadlines))
    }

    pub fn with_headlines(catalog: ContentCatalog, headlines: Box<dyn HeadlineGenerator>) -> Self {
        Self {
            catalog,
            headlines,
            state: None,
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.state.is_some()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.as_ref().map_or(GamePhase::NotStarted, GameState::phase)
    }

    /// Start a new game, replacing any game in progress.
    pub fn start_game(
        &mut self,
        setup: &GameSetup,
        rng: &mut dyn RandomSource,
    ) -> Result<&GameState, Rejection> {
        let state = create_initial_state(&self.catalog, setup, rng)?;
        validate_invariants(&state);
        Ok(&*self.state.insert(state))
    }

    /// Commit a round. The choice is matched by id against the current
    /// round; the stored copy is what gets applied.
    pub fn make_choice(
        &mut self,
        choice: &Choice,
        rng: &mut dyn RandomSource,
    ) -> Result<RoundOutcome, Rejection> {
        self.make_choice_by_id(&choice.id, rng)
    }

    pub fn make_choice_by_id(
        &mut self,
        choice_id: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<RoundOutcome, Rejection> {
        let current = self.state.as_ref().ok_or(Rejection::NotStarted)?;
        let ctx = TransitionContext {
            catalog: &self.catalog,
            headlines: self.headlines.as_ref(),
        };
        let (next, outcome) = transitions::make_choice(current, choice_id, ctx, rng)?;
        validate_invariants(&next);
        self.state = Some(next);
        Ok(outcome)
    }

    pub fn use_power_up(&mut self, kind: PowerUpType) -> Result<&GameState, Rejection> {
        let current = self.state.as_ref().ok_or(Rejection::NotStarted)?;
        let next = transitions::use_power_up(current, kind, &self.catalog)?;
        validate_invariants(&next);
        Ok(&*self.state.insert(next))
    }

    /// Drop the current game and return it.
    pub fn reset(&mut self) -> Option<GameState> {
        self.state.take()
    }

    /// Adopt a previously saved game after checking its invariants.
    pub fn restore(&mut self, state: GameState) -> Result<&GameState, String> {
        try_validate_invariants(&state)?;
        Ok(&*self.state.insert(state))
    }
}
