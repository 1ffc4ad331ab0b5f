//! Market Trial kernel: story branch classification and flavor text.

use crate::domain::{HistoryEntry, Role, StoryBranch, StrategyTag};

/// Branches need at least this many matching tags to beat the default.
const BRANCH_MIN_TALLY: usize = 2;

/// Number of leading history entries that decide the branch.
const BRANCH_WINDOW: usize = 2;

/// Classify the branch from the first two committed choices.
///
/// Tags are tallied across both choices' tag lists (inferred when a choice
/// declares none). Ties resolve innovation, then ethical, then growth;
/// everything else is stability.
pub fn classify_branch(history: &[HistoryEntry]) -> StoryBranch {
    let tags: Vec<StrategyTag> = history
        .iter()
        .take(BRANCH_WINDOW)
        .flat_map(|entry| entry.choice.effective_tags())
        .collect();
    let tally = |tag: StrategyTag| tags.iter().filter(|t| **t == tag).count();

    let max = StrategyTag::ALL.into_iter().map(tally).max().unwrap_or(0);
    let leads = |tag: StrategyTag| tally(tag) == max && max >= BRANCH_MIN_TALLY;

    if leads(StrategyTag::Innovation) {
        StoryBranch::Innovation
    } else if leads(StrategyTag::Ethical) {
        StoryBranch::Ethical
    } else if leads(StrategyTag::Aggressive) {
        StoryBranch::Growth
    } else {
        StoryBranch::Stability
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn branch_info(branch: StoryBranch) -> BranchInfo {
    match branch {
        StoryBranch::Growth => BranchInfo {
            name: "Growth path",
            description: "You pushed hard for expansion. Bigger rewards, bigger risks.",
        },
        StoryBranch::Stability => BranchInfo {
            name: "Stability path",
            description: "You kept a balanced course. Steady progress with fewer shocks.",
        },
        StoryBranch::Innovation => BranchInfo {
            name: "Innovation path",
            description: "You bet on new ideas. The market is watching what you build next.",
        },
        StoryBranch::Ethical => BranchInfo {
            name: "Ethical path",
            description: "You put fairness first. Trust is your strongest asset.",
        },
    }
}

/// Scenario prefix for rounds 3 to 5 on the given branch. Empty for other
/// rounds.
pub fn branch_scenario_prefix(role: Role, branch: StoryBranch, round: u32) -> &'static str {
    use StoryBranch::{Ethical, Growth, Innovation, Stability};

    let lines: [&'static str; 3] = match (role, branch) {
        (Role::SmallBiz, Innovation) => [
            "Your new product is getting noticed and an investor wants in. ",
            "Large partners ask about co-development deals. ",
            "You are now a case study in innovation. Expand or focus? ",
        ],
        (Role::SmallBiz, Ethical) => [
            "Loyal customers rally behind you and the press is friendly. ",
            "Your reputation opens doors with long-term partners. ",
            "You are the model of a responsible business. An IPO is on the table. ",
        ],
        (Role::SmallBiz, Growth) => [
            "Aggressive moves grew your share fast, and rivals strike back. ",
            "You now compete head-on with a large platform. ",
            "Share is up but so is the pressure. Push on or consolidate? ",
        ],
        (Role::SmallBiz, Stability) => [
            "Low-risk growth has kept you steady. A safe expansion appears. ",
            "Balanced strategy pays off and investors take note. ",
            "Your foundation is solid. Time to pick a long-term direction. ",
        ],
        (Role::Platform, Innovation) => [
            "You lead on technology and startups want to join your ecosystem. ",
            "New features set the trend, and regulators start paying attention. ",
            "Your platform is becoming the standard, with the duties that brings. ",
        ],
        (Role::Platform, Ethical) => [
            "Fair policies win praise and user trust climbs. ",
            "Sellers and users are both satisfied. You are the industry model. ",
            "You have shown that technology and ethics can go together. ",
        ],
        (Role::Platform, Growth) => [
            "Market share is soaring and monopoly accusations follow. ",
            "Scale attracts scrutiny. Growth must now meet compliance. ",
            "You dominate the market and face an antitrust probe. ",
        ],
        (Role::Platform, Stability) => [
            "Controlled growth keeps every side of the market on board. ",
            "A healthy ecosystem keeps the regulator satisfied. ",
            "A mature platform: large but responsible. ",
        ],
        (Role::Regulator, Innovation) => [
            "Smart supervision tools bring firms to the table. ",
            "AI flags violations early, improving both speed and fairness. ",
            "Other agencies study your tech-enabled model. ",
        ],
        (Role::Regulator, Ethical) => [
            "Protections for the weakest market players earn broad praise. ",
            "You balance growth and protection and are seen as a good regulator. ",
            "Your fair-competition framework becomes a regional benchmark. ",
        ],
        (Role::Regulator, Growth) => [
            "Decisive enforcement draws complaints of overreach. ",
            "Heavy fines deter violations but critics say they chill innovation. ",
            "The market complies strictly. Control must now meet innovation. ",
        ],
        (Role::Regulator, Stability) => [
            "Balanced rules protect and encourage at the same time. ",
            "Policies reconcile many interests and the market stays healthy. ",
            "Effective oversight keeps competition fair and creative. ",
        ],
    };

    match round {
        3..=5 => lines[(round - 3) as usize],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Choice;
    use crate::metrics::{MetricDelta, Metrics};

    fn entry(round: u32, tags: &[StrategyTag]) -> HistoryEntry {
        HistoryEntry {
            round,
            choice: Choice {
                id: format!("c{}", round),
                title: String::new(),
                description: String::new(),
                effects: MetricDelta::new(),
                risk_level: None,
                tags: tags.to_vec(),
            },
            metrics_after: Metrics::default(),
            event_triggered: None,
            media_headline: None,
        }
    }

    #[test]
    fn two_innovation_tags_pick_innovation() {
        let h = [
            entry(1, &[StrategyTag::Innovation]),
            entry(2, &[StrategyTag::Innovation, StrategyTag::Ethical]),
        ];
        assert_eq!(classify_branch(&h), StoryBranch::Innovation);
    }

    #[test]
    fn ethical_beats_growth_on_tie() {
        let h = [
            entry(1, &[StrategyTag::Ethical, StrategyTag::Aggressive]),
            entry(2, &[StrategyTag::Ethical, StrategyTag::Aggressive]),
        ];
        assert_eq!(classify_branch(&h), StoryBranch::Ethical);
    }

    #[test]
    fn aggressive_pair_is_growth() {
        let h = [
            entry(1, &[StrategyTag::Aggressive]),
            entry(2, &[StrategyTag::Aggressive]),
        ];
        assert_eq!(classify_branch(&h), StoryBranch::Growth);
    }

    #[test]
    fn defensive_lead_falls_back_to_stability() {
        let h = [
            entry(1, &[StrategyTag::Defensive]),
            entry(2, &[StrategyTag::Defensive]),
        ];
        assert_eq!(classify_branch(&h), StoryBranch::Stability);

        let mixed = [entry(1, &[StrategyTag::Innovation]), entry(2, &[StrategyTag::Ethical])];
        assert_eq!(classify_branch(&mixed), StoryBranch::Stability);
    }

    #[test]
    fn only_first_two_rounds_count() {
        let h = [
            entry(1, &[StrategyTag::Defensive]),
            entry(2, &[StrategyTag::Balanced]),
            entry(3, &[StrategyTag::Innovation, StrategyTag::Innovation]),
        ];
        assert_eq!(classify_branch(&h), StoryBranch::Stability);
    }

    #[test]
    fn prefix_only_for_late_rounds() {
        assert_eq!(branch_scenario_prefix(Role::Platform, StoryBranch::Growth, 2), "");
        assert!(!branch_scenario_prefix(Role::Platform, StoryBranch::Growth, 3).is_empty());
        assert!(!branch_scenario_prefix(Role::Regulator, StoryBranch::Ethical, 5).is_empty());
        assert_eq!(branch_scenario_prefix(Role::SmallBiz, StoryBranch::Stability, 6), "");
    }
}
