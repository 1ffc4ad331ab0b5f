//! Market Trial kernel: end-of-game summary.

use serde::{Deserialize, Serialize};

use crate::domain::{GameState, Role, StoryBranch, StrategyTag};
use crate::lessons::{dynamic_lessons, Lesson};
use crate::media::media_impact;
use crate::metrics::{Metric, Metrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    pub fn for_score(score: i64) -> Self {
        match score {
            s if s >= 80 => Rating::Excellent,
            s if s >= 60 => Rating::Good,
            s if s >= 40 => Rating::Fair,
            _ => Rating::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub role: Role,
    pub final_metrics: Metrics,
    pub score: i64,
    pub rating: Rating,
    pub media_impact: i64,
    pub dominant_strategy: Option<StrategyTag>,
    pub story_branch: Option<StoryBranch>,
    pub achievements: Vec<String>,
    pub rounds_played: usize,
    pub lessons: Vec<Lesson>,
}

/// Rounded mean of the given metrics. Zero when `primary` is empty.
pub fn game_score(metrics: &Metrics, primary: &[Metric]) -> i64 {
    if primary.is_empty() {
        return 0;
    }
    let total: f64 = primary.iter().map(|m| metrics.get(*m)).sum();
    (total / primary.len() as f64).round() as i64
}

/// Most frequent tag over every committed choice. Ties go to the tag
/// listed first in `StrategyTag::ALL`.
pub fn dominant_strategy(state: &GameState) -> Option<StrategyTag> {
    let tags: Vec<StrategyTag> = state
        .history
        .iter()
        .flat_map(|h| h.choice.effective_tags())
        .collect();
    let mut best: Option<(StrategyTag, usize)> = None;
    for tag in StrategyTag::ALL {
        let n = tags.iter().filter(|t| **t == tag).count();
        if n > 0 && best.map_or(true, |(_, b)| n > b) {
            best = Some((tag, n));
        }
    }
    best.map(|(tag, _)| tag)
}

impl GameResult {
    pub fn from_state(state: &GameState, primary: &[Metric]) -> Self {
        let score = game_score(&state.metrics, primary);
        Self {
            role: state.role,
            final_metrics: state.metrics,
            score,
            rating: Rating::for_score(score),
            media_impact: media_impact(&state.media_headlines),
            dominant_strategy: dominant_strategy(state),
            story_branch: state.story_branch,
            achievements: state.achievements.clone(),
            rounds_played: state.history.len(),
            lessons: dynamic_lessons(state),
        }
    }
}
