//! Market Trial kernel: game construction.

use crate::content::ContentCatalog;
use crate::domain::{
    ActivePowerUps, Difficulty, GameState, MentorType, Rejection, Role, StreakMap,
};
use crate::mentors::mentor_boost;
use crate::random::RandomSource;
use crate::rules::GameRules;

/// Everything `create_initial_state` needs besides content and randomness.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSetup {
    pub role: Role,
    pub difficulty: Difficulty,
    pub mentor: Option<MentorType>,
    pub rules: GameRules,
    /// Achievements unlocked in earlier games.
    pub achievements: Vec<String>,
}

impl GameSetup {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            difficulty: Difficulty::default(),
            mentor: None,
            rules: GameRules::default(),
            achievements: Vec::new(),
        }
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn mentor(mut self, mentor: Option<MentorType>) -> Self {
        self.mentor = mentor;
        self
    }

    pub fn rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn achievements(mut self, achievements: Vec<String>) -> Self {
        self.achievements = achievements;
        self
    }
}

/// Build a fresh game: shuffle and freeze the rounds, apply the mentor
/// boost to the role's initial metrics, carry over earlier achievements.
///
/// Fails with `UnknownRole` when the catalog has no config or no rounds for
/// the role.
pub fn create_initial_state(
    catalog: &ContentCatalog,
    setup: &GameSetup,
    rng: &mut dyn RandomSource,
) -> Result<GameState, Rejection> {
    let role_config = catalog
        .role(setup.role)
        .ok_or_else(|| Rejection::UnknownRole(setup.role.to_string()))?;

    let mut shuffled_rounds = catalog.shuffle_rounds(setup.role, rng);
    if shuffled_rounds.is_empty() {
        return Err(Rejection::UnknownRole(setup.role.to_string()));
    }
    shuffled_rounds.truncate(setup.rules.total_rounds.max(1) as usize);
    let total_rounds = shuffled_rounds.len() as u32;

    let initial = role_config.initial_metrics.clamped();
    let metrics = match setup.mentor {
        Some(mentor) => initial.with_delta(&mentor_boost(mentor)),
        None => initial,
    };

    let mut achievements: Vec<String> = Vec::with_capacity(setup.achievements.len());
    for id in &setup.achievements {
        if !achievements.contains(id) {
            achievements.push(id.clone());
        }
    }

    Ok(GameState {
        role: setup.role,
        current_round: 1,
        total_rounds,
        metrics,
        history: Vec::new(),
        is_game_over: false,
        difficulty: setup.difficulty,
        streaks: StreakMap::new(),
        achievements,
        events_history: Vec::new(),
        combo_multiplier: 1.0,
        mentor: setup.mentor,
        power_ups_used: Vec::new(),
        active_power_ups: ActivePowerUps::default(),
        story_branch: None,
        media_headlines: Vec::new(),
        shuffled_rounds,
        rules: setup.rules.clone(),
    })
}

/// Shorthand for a game with default rules and no carried achievements.
pub fn start_game(
    catalog: &ContentCatalog,
    role: Role,
    difficulty: Difficulty,
    mentor: Option<MentorType>,
    rng: &mut dyn RandomSource,
) -> Result<GameState, Rejection> {
    let setup = GameSetup::new(role).difficulty(difficulty).mentor(mentor);
    create_initial_state(catalog, &setup, rng)
}
