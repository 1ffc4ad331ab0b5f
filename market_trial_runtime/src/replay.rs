//! Replay orchestrator: rebuild a game from its action journal.
//!
//! A journal holds the game's setup, the hash of the content it was played
//! against, every random draw the kernel consumed, and the accepted
//! actions in order. Feeding the draws back through a `ScriptedRandom`
//! reproduces the game exactly, whatever source produced them.
//! All domain logic stays in the kernel.

use std::fmt;

use serde::{Deserialize, Serialize};

use market_trial_engine::content::ContentCatalog;
use market_trial_engine::domain::{Difficulty, GameState, MentorType, PowerUpType, Rejection, Role};
use market_trial_engine::engine::GameEngine;
use market_trial_engine::hashing::{canonical_hash, catalog_hash};
use market_trial_engine::random::{RandomSource, ScriptedRandom};
use market_trial_engine::rules::GameRules;
use market_trial_engine::state::GameSetup;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "value")]
pub enum JournalAction {
    Choose(String),
    PowerUp(PowerUpType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameJournal {
    pub role: Role,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<MentorType>,
    pub rules: GameRules,
    /// Achievements carried in from earlier games.
    pub achievements: Vec<String>,
    pub catalog_hash: String,
    pub draws: Vec<f64>,
    pub actions: Vec<JournalAction>,
}

impl GameJournal {
    pub fn new(setup: &GameSetup, catalog_hash: String) -> Self {
        Self {
            role: setup.role,
            difficulty: setup.difficulty,
            mentor: setup.mentor,
            rules: setup.rules.clone(),
            achievements: setup.achievements.clone(),
            catalog_hash,
            draws: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn setup(&self) -> GameSetup {
        GameSetup::new(self.role)
            .difficulty(self.difficulty)
            .mentor(self.mentor)
            .rules(self.rules.clone())
            .achievements(self.achievements.clone())
    }
}

#[derive(Debug)]
pub enum ReplayError {
    /// The journal was recorded against different content.
    CatalogMismatch { expected: String, found: String },
    /// The kernel refused a journaled action.
    Rejected { step: usize, rejection: Rejection },
    /// The replay consumed a different number of draws than were recorded.
    DrawCountMismatch { recorded: usize, consumed: usize },
    /// Two replays of the same journal ended in different states.
    NonDeterministic { first: String, second: String },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::CatalogMismatch { expected, found } => {
                write!(f, "CatalogMismatch: journal={} catalog={}", expected, found)
            }
            ReplayError::Rejected { step, rejection } => {
                write!(f, "Rejected at step {}: {}", step, rejection)
            }
            ReplayError::DrawCountMismatch { recorded, consumed } => write!(
                f,
                "DrawCountMismatch: recorded={} consumed={}",
                recorded, consumed
            ),
            ReplayError::NonDeterministic { first, second } => {
                write!(f, "NonDeterministic: run1={} run2={}", first, second)
            }
        }
    }
}

impl std::error::Error for ReplayError {}

/// Rebuild the game described by `journal`.
///
/// 1. Check the catalog is the one the journal was recorded against
/// 2. Start a fresh engine with the journaled setup
/// 3. Apply each action in order, drawing from the recorded values
/// 4. Return (final_state, canonical_hash)
pub fn rebuild_game(
    journal: &GameJournal,
    catalog: &ContentCatalog,
) -> Result<(GameState, String), ReplayError> {
    let found = catalog_hash(catalog);
    if found != journal.catalog_hash {
        return Err(ReplayError::CatalogMismatch {
            expected: journal.catalog_hash.clone(),
            found,
        });
    }

    let mut engine = GameEngine::new(catalog.clone());
    let mut rng = ScriptedRandom::new(journal.draws.clone());
    engine
        .start_game(&journal.setup(), &mut rng)
        .map_err(|rejection| ReplayError::Rejected { step: 0, rejection })?;

    for (i, action) in journal.actions.iter().enumerate() {
        let applied = match action {
            JournalAction::Choose(choice_id) => engine.make_choice_by_id(choice_id, &mut rng).map(|_| ()),
            JournalAction::PowerUp(kind) => engine.use_power_up(*kind).map(|_| ()),
        };
        applied.map_err(|rejection| ReplayError::Rejected {
            step: i + 1,
            rejection,
        })?;
    }

    if rng.draws() != journal.draws.len() {
        return Err(ReplayError::DrawCountMismatch {
            recorded: journal.draws.len(),
            consumed: rng.draws(),
        });
    }

    let Some(state) = engine.reset() else {
        unreachable!("engine holds the replayed game");
    };
    let hash = canonical_hash(&state);
    Ok((state, hash))
}

/// Replay twice and return the common hash.
pub fn verify_determinism(
    journal: &GameJournal,
    catalog: &ContentCatalog,
) -> Result<String, ReplayError> {
    let (_, first) = rebuild_game(journal, catalog)?;
    let (_, second) = rebuild_game(journal, catalog)?;
    if first != second {
        return Err(ReplayError::NonDeterministic { first, second });
    }
    Ok(first)
}

/// Wraps a source and remembers every value it hands out.
///
/// `next_index` is derived from the recorded `next_f64`, so the same index
/// comes back when the values are replayed through `ScriptedRandom`.
pub struct RecordingRandom<R> {
    inner: R,
    recorded: Vec<f64>,
}

impl<R: RandomSource> RecordingRandom<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            recorded: Vec::new(),
        }
    }

    /// Take everything recorded since the last drain.
    pub fn drain(&mut self) -> Vec<f64> {
        std::mem::take(&mut self.recorded)
    }

    /// The wrapped source, for draws that must stay out of the journal.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: RandomSource> RandomSource for RecordingRandom<R> {
    fn next_f64(&mut self) -> f64 {
        let v = self.inner.next_f64();
        self.recorded.push(v);
        v
    }
}
