//! Game service: the kernel engine plus injected storage and randomness.
//!
//! Rejected inputs are logged and ignored; the caller sees `None` or
//! `false` and the game is untouched. Persistence failures are logged by
//! the storage layer and never interrupt play.
//!
//! Persist-after-apply order for every accepted action:
//!   1. kernel transition (validated by the engine)
//!   2. journal append
//!   3. achievement / reputation writes when they changed

use std::sync::Mutex;

use market_trial_engine::content::ContentCatalog;
use market_trial_engine::domain::{
    Choice, Difficulty, GamePhase, GameState, MentorType, PowerUpType, ReputationData, Role,
    RoundOutcome,
};
use market_trial_engine::engine::GameEngine;
use market_trial_engine::hashing::catalog_hash;
use market_trial_engine::mentors::{is_advice_round, mentor_advice};
use market_trial_engine::power_ups::available_power_ups;
use market_trial_engine::random::RandomSource;
use market_trial_engine::reputation::update_reputation;
use market_trial_engine::result::GameResult;
use market_trial_engine::rules::GameRules;
use market_trial_engine::state::GameSetup;

use crate::replay::{GameJournal, JournalAction, RecordingRandom};
use crate::storage::{self, KeyValueStore};

pub struct GameService<S, R> {
    engine: GameEngine,
    catalog_hash: String,
    store: S,
    rng: RecordingRandom<R>,
    rules: GameRules,
    reputation: ReputationData,
    journal: Option<GameJournal>,
    result_recorded: bool,
}

impl<S: KeyValueStore, R: RandomSource> GameService<S, R> {
    /// Reputation is read from `store` once, here.
    pub fn new(engine: GameEngine, store: S, rng: R) -> Self {
        let reputation = storage::load_reputation(&store);
        let catalog_hash = catalog_hash(engine.catalog());
        Self {
            engine,
            catalog_hash,
            store,
            rng: RecordingRandom::new(rng),
            rules: GameRules::default(),
            reputation,
            journal: None,
            result_recorded: false,
        }
    }

    /// Rules applied to games started from now on.
    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn catalog(&self) -> &ContentCatalog {
        self.engine.catalog()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.engine.state()
    }

    pub fn is_game_started(&self) -> bool {
        self.engine.is_started()
    }

    pub fn phase(&self) -> GamePhase {
        self.engine.phase()
    }

    pub fn reputation(&self) -> &ReputationData {
        &self.reputation
    }

    /// Journal of the current or most recent game. `None` after `resume`.
    pub fn journal(&self) -> Option<&GameJournal> {
        self.journal.as_ref()
    }

    /// Start a new game, replacing any game in progress. Achievements
    /// unlocked in earlier games are loaded from storage.
    pub fn start_game(
        &mut self,
        role: Role,
        difficulty: Difficulty,
        mentor: Option<MentorType>,
    ) -> Option<&GameState> {
        let setup = GameSetup::new(role)
            .difficulty(difficulty)
            .mentor(mentor)
            .rules(self.rules.clone())
            .achievements(storage::load_achievements(&self.store));

        self.rng.drain();
        if let Err(rejection) = self.engine.start_game(&setup, &mut self.rng) {
            log::warn!("start_game ignored: {}", rejection);
            return None;
        }

        let mut journal = GameJournal::new(&setup, self.catalog_hash.clone());
        journal.draws = self.rng.drain();
        self.journal = Some(journal);
        self.result_recorded = false;
        log::info!(
            "game started: role={} difficulty={:?} mentor={:?}",
            role,
            difficulty,
            mentor
        );
        self.engine.state()
    }

    /// `start_game` for a role given by id. Unknown ids are ignored.
    pub fn start_game_by_id(
        &mut self,
        role_id: &str,
        difficulty: Difficulty,
        mentor: Option<MentorType>,
    ) -> Option<&GameState> {
        match role_id.parse::<Role>() {
            Ok(role) => self.start_game(role, difficulty, mentor),
            Err(rejection) => {
                log::warn!("start_game ignored: {}", rejection);
                None
            }
        }
    }

    pub fn make_choice(&mut self, choice: &Choice) -> Option<RoundOutcome> {
        self.make_choice_by_id(&choice.id)
    }

    /// Commit the current round with the choice `choice_id`.
    pub fn make_choice_by_id(&mut self, choice_id: &str) -> Option<RoundOutcome> {
        let outcome = match self.engine.make_choice_by_id(choice_id, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(rejection) => {
                log::warn!("make_choice ignored: {}", rejection);
                return None;
            }
        };

        let draws = self.rng.drain();
        if let Some(journal) = self.journal.as_mut() {
            journal.draws.extend(draws);
            journal.actions.push(JournalAction::Choose(choice_id.to_string()));
        }

        if !outcome.new_achievements.is_empty() {
            log::info!("achievements unlocked: {:?}", outcome.new_achievements);
            if let Some(state) = self.engine.state() {
                storage::save_achievements(&mut self.store, &state.achievements);
            }
        }
        if outcome.game_over {
            log::info!("game over after round {}", outcome.round);
        }
        Some(outcome)
    }

    /// Activate a power-up for the current game. `false` when refused.
    pub fn use_power_up(&mut self, kind: PowerUpType) -> bool {
        if let Err(rejection) = self.engine.use_power_up(kind) {
            log::warn!("use_power_up ignored: {}", rejection);
            return false;
        }
        if let Some(journal) = self.journal.as_mut() {
            journal.actions.push(JournalAction::PowerUp(kind));
        }
        log::info!("power-up activated: {}", kind.as_str());
        true
    }

    /// Power-ups the player could activate right now.
    pub fn available_power_ups(&self) -> Vec<PowerUpType> {
        match self.engine.state() {
            Some(state) if state.is_game_over || !state.power_ups_used.is_empty() => Vec::new(),
            Some(state) => available_power_ups(&state.achievements),
            None => available_power_ups(&storage::load_achievements(&self.store)),
        }
    }

    /// Advice from the game's mentor on advice rounds. These draws do not
    /// go through the journal.
    pub fn mentor_advice(&mut self) -> Option<&'static str> {
        let state = self.engine.state()?;
        let mentor = state.mentor?;
        if state.is_game_over
            || !is_advice_round(state.current_round, state.rules.mentor_advice_frequency)
        {
            return None;
        }
        Some(mentor_advice(mentor, self.rng.inner_mut()))
    }

    /// Back to no game. Achievements are persisted first.
    pub fn reset_game(&mut self) -> Option<GameState> {
        if let Some(state) = self.engine.state() {
            storage::save_achievements(&mut self.store, &state.achievements);
        }
        let finished = self.engine.reset();
        if finished.is_some() {
            log::info!("game reset");
        }
        finished
    }

    /// Score the finished game and fold it into the reputation ledger.
    /// Runs once per game; later calls return `None`.
    pub fn record_game_result(&mut self) -> Option<GameResult> {
        let state = self.engine.state()?;
        if !state.is_game_over {
            log::debug!("record_game_result: game still in progress");
            return None;
        }
        if self.result_recorded {
            log::debug!("record_game_result: already recorded");
            return None;
        }

        let primary = self
            .engine
            .catalog()
            .role(state.role)
            .map(|r| r.primary_metrics.as_slice())
            .unwrap_or_default();
        let result = GameResult::from_state(state, primary);
        self.reputation = update_reputation(
            &self.reputation,
            result.score,
            &result.achievements,
            result.media_impact,
        );
        storage::save_reputation(&mut self.store, &self.reputation);
        self.result_recorded = true;
        log::info!(
            "game recorded: score={} rating={:?} reputation={} ({:?})",
            result.score,
            result.rating,
            self.reputation.points,
            self.reputation.rank
        );
        Some(result)
    }

    /// Adopt a restored game. A game that is already over counts as
    /// recorded so it cannot be scored twice.
    pub fn resume(&mut self, state: GameState) -> bool {
        let finished = state.is_game_over;
        if let Err(msg) = self.engine.restore(state) {
            log::warn!("resume refused: {}", msg);
            return false;
        }
        self.journal = None;
        self.result_recorded = finished;
        self.rng.drain();
        log::info!("game resumed");
        true
    }
}

/// Thread-safe service handle using Mutex.
pub struct SharedGameService<S, R> {
    inner: Mutex<GameService<S, R>>,
}

impl<S: KeyValueStore, R: RandomSource> SharedGameService<S, R> {
    pub fn new(service: GameService<S, R>) -> Self {
        Self {
            inner: Mutex::new(service),
        }
    }

    /// Run `f` with exclusive access to the service.
    pub fn with<T>(&self, f: impl FnOnce(&mut GameService<S, R>) -> T) -> T {
        let mut service = self.inner.lock().expect("Service lock poisoned");
        f(&mut *service)
    }

    pub fn start_game(
        &self,
        role: Role,
        difficulty: Difficulty,
        mentor: Option<MentorType>,
    ) -> Option<GameState> {
        self.with(|s| s.start_game(role, difficulty, mentor).cloned())
    }

    pub fn make_choice_by_id(&self, choice_id: &str) -> Option<RoundOutcome> {
        self.with(|s| s.make_choice_by_id(choice_id))
    }

    pub fn use_power_up(&self, kind: PowerUpType) -> bool {
        self.with(|s| s.use_power_up(kind))
    }

    pub fn game_state(&self) -> Option<GameState> {
        self.with(|s| s.game_state().cloned())
    }

    pub fn record_game_result(&self) -> Option<GameResult> {
        self.with(|s| s.record_game_result())
    }

    pub fn reset_game(&self) -> Option<GameState> {
        self.with(|s| s.reset_game())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, ACHIEVEMENTS_KEY, REPUTATION_KEY};
    use market_trial_engine::random::ScriptedRandom;

    fn quiet_service() -> GameService<MemoryStore, ScriptedRandom> {
        // 0.9 keeps the event gate closed.
        GameService::new(
            GameEngine::default(),
            MemoryStore::new(),
            ScriptedRandom::constant(0.9),
        )
    }

    fn first_choice(service: &GameService<MemoryStore, ScriptedRandom>) -> String {
        service.game_state().unwrap().current_round_content().unwrap().choices[0]
            .id
            .clone()
    }

    #[test]
    fn unknown_role_is_a_no_op() {
        let mut service = quiet_service();
        assert!(service
            .start_game_by_id("monopoly", Difficulty::Normal, None)
            .is_none());
        assert!(!service.is_game_started());
        assert!(service.journal().is_none());
    }

    #[test]
    fn rejected_choice_leaves_state_alone() {
        let mut service = quiet_service();
        service.start_game(Role::Platform, Difficulty::Normal, None);
        let before = service.game_state().unwrap().clone();
        assert!(service.make_choice_by_id("sb_not_here").is_none());
        assert_eq!(service.game_state().unwrap(), &before);
        assert!(service.journal().unwrap().actions.is_empty());
    }

    #[test]
    fn actions_before_start_are_ignored() {
        let mut service = quiet_service();
        assert!(service.make_choice_by_id("anything").is_none());
        assert!(!service.use_power_up(PowerUpType::MarketInsight));
        assert!(service.record_game_result().is_none());
    }

    #[test]
    fn finished_game_persists_achievements_and_reputation_once() {
        let mut service = quiet_service();
        service.start_game(Role::SmallBiz, Difficulty::Normal, None);
        while service.phase() == GamePhase::InProgress {
            let id = first_choice(&service);
            service.make_choice_by_id(&id).unwrap();
        }

        let stored = service.store().get(ACHIEVEMENTS_KEY).unwrap().unwrap();
        assert!(stored.contains("first_victory"));

        let result = service.record_game_result().unwrap();
        assert_eq!(service.reputation().total_games_played, 1);
        assert_eq!(service.reputation().best_score, result.score);
        assert!(service.store().get(REPUTATION_KEY).unwrap().is_some());

        assert!(service.record_game_result().is_none());
        assert_eq!(service.reputation().total_games_played, 1);
    }

    #[test]
    fn stored_achievements_unlock_power_ups_next_game() {
        let mut service = quiet_service();
        assert!(service.available_power_ups().is_empty());
        storage::save_achievements(
            &mut service.store,
            &["first_victory".to_string(), "combo_master".to_string()],
        );
        assert_eq!(
            service.available_power_ups(),
            vec![PowerUpType::MarketInsight, PowerUpType::RegulatoryShield]
        );

        service.start_game(Role::Regulator, Difficulty::Easy, None);
        assert!(!service.use_power_up(PowerUpType::StrategicPause));
        assert!(service.use_power_up(PowerUpType::RegulatoryShield));
        assert!(service.available_power_ups().is_empty());
        assert!(!service.use_power_up(PowerUpType::MarketInsight));
        assert_eq!(
            service.journal().unwrap().actions,
            vec![JournalAction::PowerUp(PowerUpType::RegulatoryShield)]
        );
    }

    #[test]
    fn mentor_speaks_on_advice_rounds_only() {
        let mut service = quiet_service();
        service.start_game(Role::Platform, Difficulty::Normal, Some(MentorType::Economist));
        assert!(service.mentor_advice().is_none());
        let id = first_choice(&service);
        service.make_choice_by_id(&id);
        assert!(service.mentor_advice().is_some());
    }

    #[test]
    fn reset_returns_the_finished_game() {
        let mut service = quiet_service();
        service.start_game(Role::Platform, Difficulty::Hard, None);
        let id = first_choice(&service);
        service.make_choice_by_id(&id);
        let dropped = service.reset_game().unwrap();
        assert_eq!(dropped.history.len(), 1);
        assert!(!service.is_game_started());
        assert!(service.reset_game().is_none());
    }

    #[test]
    fn shared_service_serializes_access() {
        let shared = SharedGameService::new(quiet_service());
        let state = shared.start_game(Role::Regulator, Difficulty::Normal, None).unwrap();
        let id = state.current_round_content().unwrap().choices[2].id.clone();
        let outcome = shared.make_choice_by_id(&id).unwrap();
        assert_eq!(outcome.round, 1);
        assert_eq!(shared.game_state().unwrap().current_round, 2);
    }
}
