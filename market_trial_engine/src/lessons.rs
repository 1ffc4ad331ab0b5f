//! Market Trial kernel: end-of-game lessons.
//!
//! Four lessons are picked from the finished game, one per slot: strategy,
//! events, metrics and achievements. Only the selection is decided here;
//! wording belongs to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::domain::{EventKind, GameState, StrategyTag};
use crate::metrics::Metric;

/// Declared-tag count needed before a focused strategy lesson applies.
pub const FOCUS_TAG_COUNT: usize = 3;
/// Events of one kind needed before an event lesson applies.
pub const EVENT_LESSON_COUNT: usize = 2;
pub const STRONG_METRIC: f64 = 80.0;
pub const WEAK_METRIC: f64 = 30.0;
pub const MANY_ACHIEVEMENTS: usize = 8;
pub const SOME_ACHIEVEMENTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "topic")]
pub enum Lesson {
    /// Slot 1: the dominant declared tag, with its count.
    Focus { tag: StrategyTag, choices: usize },
    Balanced,
    /// Slot 2.
    CrisisSurvived { negative_events: usize },
    OpportunitySeized { positive_events: usize },
    SteadyCourse,
    /// Slot 3.
    StrongMetric { metric: Metric, value: f64 },
    WeakMetric { metric: Metric, value: f64 },
    WellRounded,
    /// Slot 4.
    ChallengeConqueror { unlocked: usize },
    SteadyProgress { unlocked: usize },
    JourneyBegins { unlocked: usize },
}

impl Lesson {
    pub fn title(&self) -> &'static str {
        match self {
            Lesson::Focus { tag: StrategyTag::Innovation, .. } => "The power of innovation",
            Lesson::Focus { tag: StrategyTag::Aggressive, .. } => "Going on the offensive",
            Lesson::Focus { .. } => "Business ethics",
            Lesson::Balanced => "Strategic balance",
            Lesson::CrisisSurvived { .. } => "Weathering the crisis",
            Lesson::OpportunitySeized { .. } => "Seizing opportunities",
            Lesson::SteadyCourse => "Stability in turbulence",
            Lesson::StrongMetric { .. } => "Excellence",
            Lesson::WeakMetric { .. } => "Room to improve",
            Lesson::WellRounded => "All-round growth",
            Lesson::ChallengeConqueror { .. } => "Challenge conqueror",
            Lesson::SteadyProgress { .. } => "Steady progress",
            Lesson::JourneyBegins { .. } => "The journey begins",
        }
    }
}

/// Tag that appears most often across declared choice tags. Ties go to the
/// tag seen first in play order.
fn leading_declared_tag(state: &GameState) -> Option<(StrategyTag, usize)> {
    let mut counts: Vec<(StrategyTag, usize)> = Vec::new();
    for tag in state.history.iter().flat_map(|h| h.choice.tags.iter()) {
        match counts.iter_mut().find(|(t, _)| t == tag) {
            Some((_, n)) => *n += 1,
            None => counts.push((*tag, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best, (tag, n)| match best {
            Some((_, b)) if b >= n => best,
            _ => Some((tag, n)),
        })
}

fn strategy_lesson(state: &GameState) -> Lesson {
    match leading_declared_tag(state) {
        Some((tag, choices))
            if choices >= FOCUS_TAG_COUNT
                && matches!(
                    tag,
                    StrategyTag::Innovation | StrategyTag::Aggressive | StrategyTag::Ethical
                ) =>
        {
            Lesson::Focus { tag, choices }
        }
        _ => Lesson::Balanced,
    }
}

fn event_lesson(state: &GameState) -> Lesson {
    let negative_events = state.count_events(EventKind::Negative);
    let positive_events = state.count_events(EventKind::Positive);
    if negative_events >= EVENT_LESSON_COUNT {
        Lesson::CrisisSurvived { negative_events }
    } else if positive_events >= EVENT_LESSON_COUNT {
        Lesson::OpportunitySeized { positive_events }
    } else {
        Lesson::SteadyCourse
    }
}

fn metric_lesson(state: &GameState) -> Lesson {
    let m = &state.metrics;
    // First metric in declaration order wins ties on both ends.
    let highest = Metric::ALL
        .into_iter()
        .fold(Metric::Revenue, |a, b| if m.get(b) > m.get(a) { b } else { a });
    let lowest = Metric::ALL
        .into_iter()
        .fold(Metric::Revenue, |a, b| if m.get(b) < m.get(a) { b } else { a });

    if m.get(highest) >= STRONG_METRIC {
        Lesson::StrongMetric { metric: highest, value: m.get(highest) }
    } else if m.get(lowest) <= WEAK_METRIC {
        Lesson::WeakMetric { metric: lowest, value: m.get(lowest) }
    } else {
        Lesson::WellRounded
    }
}

fn achievement_lesson(state: &GameState) -> Lesson {
    let unlocked = state.achievements.len();
    if unlocked >= MANY_ACHIEVEMENTS {
        Lesson::ChallengeConqueror { unlocked }
    } else if unlocked >= SOME_ACHIEVEMENTS {
        Lesson::SteadyProgress { unlocked }
    } else {
        Lesson::JourneyBegins { unlocked }
    }
}

/// The four lessons for a game, in slot order.
pub fn dynamic_lessons(state: &GameState) -> Vec<Lesson> {
    vec![
        strategy_lesson(state),
        event_lesson(state),
        metric_lesson(state),
        achievement_lesson(state),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentCatalog;
    use crate::domain::{Choice, HistoryEntry, RandomEvent, Role};
    use crate::metrics::{MetricDelta, Metrics};
    use crate::random::ScriptedRandom;
    use crate::state::start_game;

    fn fresh() -> GameState {
        let mut state = start_game(
            &ContentCatalog::builtin(),
            Role::SmallBiz,
            Default::default(),
            None,
            &mut ScriptedRandom::constant(0.0),
        )
        .unwrap();
        state.metrics = Metrics::uniform(50.0);
        state
    }

    fn played(tags: Vec<StrategyTag>) -> HistoryEntry {
        HistoryEntry {
            round: 1,
            choice: Choice {
                id: "c".to_string(),
                title: String::new(),
                description: String::new(),
                effects: MetricDelta::new(),
                risk_level: None,
                tags,
            },
            metrics_after: Metrics::uniform(50.0),
            event_triggered: None,
            media_headline: None,
        }
    }

    fn event(kind: EventKind) -> RandomEvent {
        RandomEvent {
            id: format!("{:?}", kind),
            title: String::new(),
            description: String::new(),
            kind,
            effects: MetricDelta::new(),
            probability: 0.1,
            roles: None,
            trigger: None,
        }
    }

    #[test]
    fn four_lessons_in_slot_order() {
        let lessons = dynamic_lessons(&fresh());
        assert_eq!(
            lessons,
            vec![
                Lesson::Balanced,
                Lesson::SteadyCourse,
                Lesson::WellRounded,
                Lesson::JourneyBegins { unlocked: 0 },
            ]
        );
    }

    #[test]
    fn focus_needs_three_tagged_choices() {
        let mut state = fresh();
        state.history = vec![played(vec![StrategyTag::Innovation]); 2];
        assert_eq!(strategy_lesson(&state), Lesson::Balanced);

        state.history.push(played(vec![StrategyTag::Innovation, StrategyTag::Ethical]));
        assert_eq!(
            strategy_lesson(&state),
            Lesson::Focus { tag: StrategyTag::Innovation, choices: 3 }
        );
    }

    #[test]
    fn defensive_focus_falls_back_to_balanced() {
        let mut state = fresh();
        state.history = vec![played(vec![StrategyTag::Defensive]); 4];
        assert_eq!(strategy_lesson(&state), Lesson::Balanced);
    }

    #[test]
    fn tag_tie_goes_to_first_seen() {
        let mut state = fresh();
        state.history = vec![
            played(vec![StrategyTag::Aggressive]),
            played(vec![StrategyTag::Ethical]),
            played(vec![StrategyTag::Ethical, StrategyTag::Aggressive]),
            played(vec![StrategyTag::Aggressive, StrategyTag::Ethical]),
        ];
        assert_eq!(
            strategy_lesson(&state),
            Lesson::Focus { tag: StrategyTag::Aggressive, choices: 3 }
        );
    }

    #[test]
    fn untagged_choices_count_for_nothing() {
        let mut state = fresh();
        state.history = vec![played(Vec::new()); 5];
        assert_eq!(strategy_lesson(&state), Lesson::Balanced);
    }

    #[test]
    fn event_lessons_need_two_of_a_kind() {
        let mut state = fresh();
        state.events_history = vec![event(EventKind::Negative), event(EventKind::Positive)];
        assert_eq!(event_lesson(&state), Lesson::SteadyCourse);

        state.events_history.push(event(EventKind::Positive));
        assert_eq!(event_lesson(&state), Lesson::OpportunitySeized { positive_events: 2 });

        // Negative outranks positive.
        state.events_history.push(event(EventKind::Negative));
        assert_eq!(event_lesson(&state), Lesson::CrisisSurvived { negative_events: 2 });
    }

    #[test]
    fn metric_lesson_boundaries() {
        let mut state = fresh();
        state.metrics = Metrics::new(79.0, 50.0, 31.0, 50.0, 50.0, 50.0);
        assert_eq!(metric_lesson(&state), Lesson::WellRounded);

        state.metrics = Metrics::new(79.0, 50.0, 30.0, 50.0, 50.0, 50.0);
        assert_eq!(
            metric_lesson(&state),
            Lesson::WeakMetric { metric: Metric::UserTrust, value: 30.0 }
        );

        // A strong metric wins over a weak one.
        state.metrics = Metrics::new(50.0, 50.0, 10.0, 80.0, 50.0, 80.0);
        assert_eq!(
            metric_lesson(&state),
            Lesson::StrongMetric { metric: Metric::Innovation, value: 80.0 }
        );
    }

    #[test]
    fn achievement_tiers() {
        let mut state = fresh();
        state.achievements = (0..3).map(|i| format!("a{}", i)).collect();
        assert_eq!(achievement_lesson(&state), Lesson::JourneyBegins { unlocked: 3 });
        state.achievements = (0..4).map(|i| format!("a{}", i)).collect();
        assert_eq!(achievement_lesson(&state), Lesson::SteadyProgress { unlocked: 4 });
        state.achievements = (0..7).map(|i| format!("a{}", i)).collect();
        assert_eq!(achievement_lesson(&state), Lesson::SteadyProgress { unlocked: 7 });
        state.achievements = (0..8).map(|i| format!("a{}", i)).collect();
        assert_eq!(achievement_lesson(&state), Lesson::ChallengeConqueror { unlocked: 8 });
    }

    #[test]
    fn titles_follow_focus_tag() {
        assert_eq!(
            Lesson::Focus { tag: StrategyTag::Ethical, choices: 3 }.title(),
            "Business ethics"
        );
        assert_eq!(Lesson::SteadyCourse.title(), "Stability in turbulence");
    }
}
