//! Market Trial kernel: cross-game reputation ledger.

use crate::domain::{ReputationData, ReputationRank};

const MEDIA_IMPACT_MIN: i64 = -20;
const MEDIA_IMPACT_MAX: i64 = 30;
const POINTS_PER_ACHIEVEMENT: i64 = 10;

/// Rank is a pure step function of points.
pub fn rank_for_points(points: i64) -> ReputationRank {
    match points {
        p if p >= 600 => ReputationRank::Legendary,
        p if p >= 300 => ReputationRank::Respected,
        p if p >= 100 => ReputationRank::Known,
        _ => ReputationRank::Unknown,
    }
}

/// Base points for a final game score.
pub fn score_points(game_score: i64) -> i64 {
    match game_score {
        s if s >= 80 => 50,
        s if s >= 60 => 30,
        s if s >= 40 => 15,
        _ => 5,
    }
}

/// Points earned by one finished game. `achievement_count` is the size of
/// the session's achievement list, not the delta.
pub fn points_earned(game_score: i64, achievement_count: usize, media_impact: i64) -> i64 {
    score_points(game_score)
        + POINTS_PER_ACHIEVEMENT * achievement_count as i64
        + media_impact.clamp(MEDIA_IMPACT_MIN, MEDIA_IMPACT_MAX)
}

/// Fold one finished game into the ledger.
pub fn update_reputation(
    prev: &ReputationData,
    game_score: i64,
    achievements: &[String],
    media_impact: i64,
) -> ReputationData {
    let earned = points_earned(game_score, achievements.len(), media_impact);
    let points = (prev.points + earned).max(0);
    ReputationData {
        points,
        rank: rank_for_points(points),
        total_games_played: prev.total_games_played + 1,
        best_score: prev.best_score.max(game_score),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankProgress {
    pub current: i64,
    pub max: i64,
    pub percentage: f64,
}

/// Progress through the current rank band.
pub fn next_rank_progress(points: i64) -> RankProgress {
    let (current, max) = match points {
        p if p < 100 => (p, 100),
        p if p < 300 => (p - 100, 200),
        p if p < 600 => (p - 300, 300),
        // Legendary has no ceiling; the band is nominal.
        p => (p - 600, 1000),
    };
    let percentage = (current as f64 / max as f64 * 100.0).min(100.0);
    RankProgress {
        current,
        max,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_ninety_to_two_hundred() {
        let prev = ReputationData {
            points: 90,
            ..Default::default()
        };
        let achievements: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let next = update_reputation(&prev, 85, &achievements, 40);
        assert_eq!(next.points, 200);
        assert_eq!(next.rank, ReputationRank::Known);
        assert_eq!(next.total_games_played, 1);
        assert_eq!(next.best_score, 85);
    }

    #[test]
    fn points_never_go_negative() {
        let next = update_reputation(&ReputationData::default(), 10, &[], -100);
        // 5 base, media clamped to -20
        assert_eq!(next.points, 0);
        assert_eq!(next.rank, ReputationRank::Unknown);
    }

    #[test]
    fn best_score_is_kept() {
        let prev = ReputationData {
            best_score: 90,
            ..Default::default()
        };
        assert_eq!(update_reputation(&prev, 70, &[], 0).best_score, 90);
    }

    #[test]
    fn rank_boundaries() {
        assert_eq!(rank_for_points(99), ReputationRank::Unknown);
        assert_eq!(rank_for_points(100), ReputationRank::Known);
        assert_eq!(rank_for_points(300), ReputationRank::Respected);
        assert_eq!(rank_for_points(599), ReputationRank::Respected);
        assert_eq!(rank_for_points(600), ReputationRank::Legendary);
    }

    #[test]
    fn rank_is_reproducible_from_points() {
        let mut rep = ReputationData::default();
        for (score, media) in [(85, 10), (30, -50), (65, 45), (90, 25), (45, 0)] {
            rep = update_reputation(&rep, score, &["x".to_string()], media);
            assert_eq!(rank_for_points(rep.points), rep.rank);
        }
    }

    #[test]
    fn progress_bands() {
        assert_eq!(next_rank_progress(50).max, 100);
        let p = next_rank_progress(200);
        assert_eq!((p.current, p.max), (100, 200));
        assert_eq!(p.percentage, 50.0);
        assert_eq!(next_rank_progress(450).current, 150);
        assert_eq!(next_rank_progress(700).max, 1000);
    }
}
