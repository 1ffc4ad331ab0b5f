#![forbid(unsafe_code)]

//! Market Trial kernel: the pure game-state simulation behind the market
//! competition game. Every transition is a function of the previous state,
//! the content catalog and an injected `RandomSource`.

/// Kernel v1. Bumped whenever canonical hashes of the same play change.
pub const KERNEL_VERSION: u32 = 1;

pub mod metrics;
pub mod domain;
pub mod rules;
pub mod random;
pub mod content;
pub mod streaks;
pub mod events;
pub mod story;
pub mod power_ups;
pub mod achievements;
pub mod reputation;
pub mod mentors;
pub mod media;
pub mod lessons;
pub mod result;
pub mod state;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use domain::{GameState, Rejection, Role, RoundOutcome};
pub use engine::GameEngine;
pub use state::GameSetup;
