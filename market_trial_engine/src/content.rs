//! Market Trial kernel: content catalog.
//!
//! Role table, per-role round catalog and random-event catalog. The kernel
//! treats all of it as opaque configuration; `ContentCatalog::builtin()`
//! is the shipped content and any other catalog can be loaded from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Choice, EventKind, RandomEvent, RiskLevel, Role, Round, StrategyTag, TriggerCondition,
};
use crate::metrics::{Metric, MetricDelta, Metrics};
use crate::random::{shuffle, RandomSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoleConfig {
    pub id: Role,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub primary_metrics: Vec<Metric>,
    pub initial_metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentCatalog {
    pub roles: Vec<RoleConfig>,
    pub rounds: BTreeMap<Role, Vec<Round>>,
    pub events: Vec<RandomEvent>,
}

impl Default for ContentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ContentCatalog {
    pub fn builtin() -> Self {
        let mut rounds = BTreeMap::new();
        rounds.insert(Role::SmallBiz, smallbiz_rounds());
        rounds.insert(Role::Platform, platform_rounds());
        rounds.insert(Role::Regulator, regulator_rounds());
        Self {
            roles: role_table(),
            rounds,
            events: event_catalog(),
        }
    }

    pub fn role(&self, role: Role) -> Option<&RoleConfig> {
        self.roles.iter().find(|r| r.id == role)
    }

    pub fn rounds_for(&self, role: Role) -> &[Round] {
        self.rounds.get(&role).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Shuffle round order and each round's choices, then renumber rounds
    /// 1..N in the shuffled order. Called once per game.
    pub fn shuffle_rounds(&self, role: Role, rng: &mut dyn RandomSource) -> Vec<Round> {
        let mut rounds = self.rounds_for(role).to_vec();
        shuffle(&mut rounds, rng);
        for (idx, round) in rounds.iter_mut().enumerate() {
            round.round_number = idx as u32 + 1;
            shuffle(&mut round.choices, rng);
        }
        rounds
    }
}

// ── Role table ─────────────────────────────────────────────────────

fn role_table() -> Vec<RoleConfig> {
    vec![
        RoleConfig {
            id: Role::SmallBiz,
            name: "Small Business".to_string(),
            description: "A local firm competing against much larger rivals.".to_string(),
            primary_metrics: vec![Metric::Revenue, Metric::MarketShare, Metric::Innovation],
            initial_metrics: Metrics::new(40.0, 20.0, 50.0, 50.0, 50.0, 50.0),
        },
        RoleConfig {
            id: Role::Platform,
            name: "Technology Platform".to_string(),
            description: "A dominant digital marketplace balancing growth and trust.".to_string(),
            primary_metrics: vec![Metric::Revenue, Metric::MarketShare, Metric::UserTrust],
            initial_metrics: Metrics::new(70.0, 75.0, 60.0, 60.0, 45.0, 40.0),
        },
        RoleConfig {
            id: Role::Regulator,
            name: "Competition Regulator".to_string(),
            description: "The authority keeping the market open and fair.".to_string(),
            primary_metrics: vec![Metric::PublicWelfare, Metric::Fairness, Metric::UserTrust],
            initial_metrics: Metrics::new(50.0, 50.0, 55.0, 45.0, 50.0, 50.0),
        },
    ]
}

// ── Builders ───────────────────────────────────────────────────────

fn delta(entries: &[(Metric, f64)]) -> MetricDelta {
    entries
        .iter()
        .fold(MetricDelta::new(), |d, &(m, v)| d.with(m, v))
}

fn choice(
    id: &str,
    title: &str,
    effects: &[(Metric, f64)],
    risk: RiskLevel,
    tags: &[StrategyTag],
) -> Choice {
    Choice {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        effects: delta(effects),
        risk_level: Some(risk),
        tags: tags.to_vec(),
    }
}

fn round(number: u32, scenario: &str, choices: Vec<Choice>) -> Round {
    Round {
        round_number: number,
        scenario: scenario.to_string(),
        choices,
    }
}

use Metric::{Fairness, Innovation, MarketShare, PublicWelfare, Revenue, UserTrust};
use RiskLevel::{High, Low, Medium};
use StrategyTag::{Aggressive, Balanced, Defensive, Ethical};

// ── Rounds: small business ─────────────────────────────────────────

fn smallbiz_rounds() -> Vec<Round> {
    vec![
        round(1, "A large platform launches a cheaper copy of your best-selling product.", vec![
            choice("sb_price_war", "Match the price cut", &[(Revenue, -10.0), (MarketShare, 8.0)], High, &[Aggressive]),
            choice("sb_new_feature", "Ship a feature they cannot copy", &[(Innovation, 15.0), (Revenue, -5.0)], Medium, &[StrategyTag::Innovation]),
            choice("sb_loyalty", "Reward loyal customers", &[(UserTrust, 10.0), (Revenue, -3.0)], Low, &[Defensive]),
        ]),
        round(2, "The platform demands exclusive listing terms to stay on its marketplace.", vec![
            choice("sb_accept_terms", "Accept exclusivity", &[(Revenue, 12.0), (Fairness, -8.0)], Medium, &[Aggressive]),
            choice("sb_report", "Report the terms to the regulator", &[(Fairness, 12.0), (Revenue, -6.0)], Medium, &[Ethical]),
            choice("sb_own_channel", "Build a direct sales channel", &[(Innovation, 12.0), (MarketShare, -4.0)], High, &[StrategyTag::Innovation]),
        ]),
        round(3, "Investors offer capital in exchange for aggressive growth targets.", vec![
            choice("sb_take_funding", "Take the money and scale", &[(Revenue, 15.0), (MarketShare, 10.0), (UserTrust, -5.0)], High, &[Aggressive]),
            choice("sb_rnd_grant", "Apply for a research grant instead", &[(Innovation, 14.0), (PublicWelfare, 4.0)], Medium, &[StrategyTag::Innovation]),
            choice("sb_stay_lean", "Stay independent and lean", &[(UserTrust, 5.0), (Revenue, 3.0)], Low, &[Defensive]),
        ]),
        round(4, "Local competitors propose a purchasing cooperative.", vec![
            choice("sb_join_coop", "Join the cooperative", &[(Fairness, 11.0), (MarketShare, 5.0)], Low, &[Ethical, Balanced]),
            choice("sb_undercut", "Undercut them while they organise", &[(Revenue, 11.0), (Fairness, -10.0)], High, &[Aggressive]),
            choice("sb_partner_tech", "Co-develop shared tooling", &[(Innovation, 11.0), (Fairness, 5.0)], Medium, &[StrategyTag::Innovation, Ethical]),
        ]),
        round(5, "A customer data leak hits a competitor; buyers look for safer options.", vec![
            choice("sb_privacy_first", "Publish a privacy-first pledge", &[(UserTrust, 12.0), (Fairness, 6.0)], Low, &[Ethical]),
            choice("sb_poach", "Run ads targeting their customers", &[(MarketShare, 12.0), (Revenue, 8.0), (UserTrust, -4.0)], Medium, &[Aggressive]),
            choice("sb_secure_tech", "Invest in encryption", &[(Innovation, 13.0), (UserTrust, 6.0), (Revenue, -5.0)], Medium, &[StrategyTag::Innovation]),
        ]),
    ]
}

// ── Rounds: platform ───────────────────────────────────────────────

fn platform_rounds() -> Vec<Round> {
    vec![
        round(1, "Sellers complain that search ranking favours your own products.", vec![
            choice("pf_self_prefer", "Keep self-preferencing", &[(Revenue, 14.0), (Fairness, -12.0), (UserTrust, -6.0)], High, &[Aggressive]),
            choice("pf_neutral_rank", "Make ranking neutral and auditable", &[(Fairness, 14.0), (UserTrust, 8.0), (Revenue, -6.0)], Medium, &[Ethical]),
            choice("pf_label", "Label own products clearly", &[(UserTrust, 6.0), (Fairness, 4.0)], Low, &[Defensive, Balanced]),
        ]),
        round(2, "A promising startup builds a tool that competes with one of your services.", vec![
            choice("pf_acquire", "Acquire the startup", &[(MarketShare, 12.0), (Revenue, 8.0), (Fairness, -10.0)], High, &[Aggressive]),
            choice("pf_open_api", "Open your API to them", &[(Innovation, 12.0), (Fairness, 8.0), (MarketShare, -4.0)], Medium, &[StrategyTag::Innovation, Ethical]),
            choice("pf_ignore", "Let the market decide", &[(PublicWelfare, 4.0)], Low, &[Defensive]),
        ]),
        round(3, "An AI recommendation engine could lift conversion but needs more user data.", vec![
            choice("pf_ai_consent", "Launch it with explicit consent", &[(Innovation, 15.0), (UserTrust, 6.0), (Revenue, 4.0)], Medium, &[StrategyTag::Innovation, Ethical]),
            choice("pf_ai_silent", "Launch it on existing data", &[(Revenue, 15.0), (UserTrust, -12.0)], High, &[Aggressive]),
            choice("pf_ai_wait", "Wait for clearer rules", &[(UserTrust, 4.0), (Innovation, -3.0)], Low, &[Defensive]),
        ]),
        round(4, "Seller fees are the main profit driver; small merchants say they are unaffordable.", vec![
            choice("pf_raise_fees", "Raise fees again", &[(Revenue, 16.0), (Fairness, -8.0), (PublicWelfare, -6.0)], High, &[Aggressive]),
            choice("pf_tiered_fees", "Introduce a small-seller tier", &[(Fairness, 12.0), (PublicWelfare, 6.0), (Revenue, -5.0)], Medium, &[Ethical]),
            choice("pf_freeze_fees", "Freeze fees for a year", &[(UserTrust, 5.0), (Revenue, 2.0)], Low, &[Defensive, Balanced]),
        ]),
        round(5, "The regulator opens an inquiry into your market conduct.", vec![
            choice("pf_cooperate", "Cooperate fully", &[(Fairness, 12.0), (UserTrust, 8.0), (Revenue, -4.0)], Low, &[Ethical]),
            choice("pf_lobby", "Lobby against the inquiry", &[(Revenue, 11.0), (PublicWelfare, -8.0), (UserTrust, -6.0)], High, &[Aggressive]),
            choice("pf_transparency_tool", "Build a public transparency dashboard", &[(Innovation, 12.0), (UserTrust, 7.0)], Medium, &[StrategyTag::Innovation]),
        ]),
    ]
}

// ── Rounds: regulator ──────────────────────────────────────────────

fn regulator_rounds() -> Vec<Round> {
    vec![
        round(1, "A dominant platform is accused of copying sellers' products.", vec![
            choice("rg_investigate", "Open a formal investigation", &[(Fairness, 14.0), (PublicWelfare, 6.0), (Innovation, -4.0)], Medium, &[Ethical]),
            choice("rg_fine", "Impose an immediate fine", &[(Fairness, 8.0), (Revenue, 12.0), (UserTrust, -4.0)], High, &[Aggressive]),
            choice("rg_guidance", "Issue guidance and monitor", &[(UserTrust, 4.0)], Low, &[Defensive]),
        ]),
        round(2, "Startups ask for a regulatory sandbox to test new payment products.", vec![
            choice("rg_sandbox", "Launch the sandbox", &[(Innovation, 15.0), (MarketShare, 4.0), (UserTrust, -3.0)], Medium, &[StrategyTag::Innovation]),
            choice("rg_strict_licence", "Require full licences first", &[(UserTrust, 8.0), (Innovation, -6.0)], Low, &[Defensive]),
            choice("rg_consumer_rules", "Pair the sandbox with consumer safeguards", &[(Fairness, 11.0), (Innovation, 6.0)], Medium, &[Ethical, Balanced]),
        ]),
        round(3, "Two of the largest firms announce a merger.", vec![
            choice("rg_block_merger", "Block the merger", &[(Fairness, 15.0), (PublicWelfare, 8.0), (Revenue, -6.0)], High, &[Ethical, Aggressive]),
            choice("rg_conditions", "Approve with divestment conditions", &[(Fairness, 6.0), (MarketShare, 5.0), (PublicWelfare, 4.0)], Medium, &[Balanced]),
            choice("rg_approve", "Approve it unconditionally", &[(Revenue, 12.0), (Fairness, -12.0)], Low, &[Defensive]),
        ]),
        round(4, "Algorithmic pricing appears to be keeping prices high across an industry.", vec![
            choice("rg_ai_monitor", "Deploy AI market monitoring", &[(Innovation, 14.0), (Fairness, 6.0)], Medium, &[StrategyTag::Innovation]),
            choice("rg_price_caps", "Impose temporary price caps", &[(PublicWelfare, 12.0), (Revenue, -8.0), (Innovation, -5.0)], High, &[Aggressive]),
            choice("rg_study", "Commission a market study", &[(UserTrust, 5.0)], Low, &[Defensive, Balanced]),
        ]),
        round(5, "Small businesses petition for protection from platform fee hikes.", vec![
            choice("rg_fee_rules", "Mandate fair fee rules", &[(Fairness, 13.0), (PublicWelfare, 7.0), (Revenue, -4.0)], Medium, &[Ethical]),
            choice("rg_subsidy", "Fund a digital upskilling programme", &[(Innovation, 11.0), (PublicWelfare, 6.0)], Low, &[StrategyTag::Innovation, Balanced]),
            choice("rg_enforce_hard", "Launch sweeping enforcement action", &[(Fairness, 10.0), (Revenue, 11.0), (UserTrust, -6.0)], High, &[Aggressive]),
        ]),
    ]
}

// ── Random events ──────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn event(
    id: &str,
    title: &str,
    description: &str,
    kind: EventKind,
    effects: &[(Metric, f64)],
    probability: f64,
    roles: Option<&[Role]>,
    trigger: Option<TriggerCondition>,
) -> RandomEvent {
    RandomEvent {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind,
        effects: delta(effects),
        probability,
        roles: roles.map(|r| r.to_vec()),
        trigger,
    }
}

/// Declaration order matters: the weighted draw walks this list.
pub fn event_catalog() -> Vec<RandomEvent> {
    use EventKind::{Negative, Neutral, Positive};
    use Role::{Platform, Regulator, SmallBiz};

    vec![
        event("viral_success", "Viral on social media", "An influencer mentions your product and traffic explodes.",
            Positive, &[(Revenue, 15.0), (MarketShare, 10.0), (UserTrust, 10.0)], 0.15, Some(&[SmallBiz, Platform]), None),
        event("innovation_award", "Innovation award", "An industry body names you the most innovative company of the year.",
            Positive, &[(Innovation, 20.0), (UserTrust, 15.0), (Revenue, 10.0)], 0.1, Some(&[SmallBiz, Platform]),
            Some(TriggerCondition::MetricAtLeast { metric: Innovation, value: 70.0 })),
        event("policy_support", "Small business support package", "The government announces tax relief and cheap credit for small firms.",
            Positive, &[(Revenue, 12.0), (MarketShare, 8.0), (PublicWelfare, 5.0)], 0.12, Some(&[SmallBiz]), None),
        event("partnership_offer", "Partnership offer", "A large company proposes a strategic partnership.",
            Positive, &[(MarketShare, 15.0), (Revenue, 10.0), (Innovation, 5.0)], 0.1, Some(&[SmallBiz, Platform]), None),
        event("positive_media", "Positive press", "Major outlets praise the push for fair competition.",
            Positive, &[(PublicWelfare, 15.0), (Fairness, 10.0), (UserTrust, 10.0)], 0.12, Some(&[Regulator]), None),
        event("data_breach", "Data breach", "A security hole exposes user data and trust collapses.",
            Negative, &[(UserTrust, -25.0), (Revenue, -15.0), (MarketShare, -10.0)], 0.08, Some(&[Platform]),
            Some(TriggerCondition::MetricBelow { metric: UserTrust, value: 50.0 })),
        event("competitor_attack", "Competitor price attack", "A rival halves its prices for a month and customers follow.",
            Negative, &[(Revenue, -20.0), (MarketShare, -15.0), (UserTrust, -5.0)], 0.15, Some(&[SmallBiz, Platform]), None),
        event("supply_chain_crisis", "Supply chain crisis", "Input costs jump 40% and margins shrink.",
            Negative, &[(Revenue, -15.0), (Innovation, -10.0)], 0.12, Some(&[SmallBiz]), None),
        event("public_scandal", "Public scandal", "A leadership scandal damages the brand.",
            Negative, &[(UserTrust, -30.0), (Revenue, -10.0), (MarketShare, -12.0)], 0.07, Some(&[Platform]), None),
        event("regulatory_criticism", "Public criticism", "A recent decision draws a strong public backlash.",
            Negative, &[(PublicWelfare, -15.0), (Fairness, -10.0)], 0.1, Some(&[Regulator]),
            Some(TriggerCondition::MetricBelow { metric: Fairness, value: 55.0 })),
        event("market_shift", "Market shift", "Consumer tastes change suddenly, opening risky opportunities.",
            Neutral, &[(Innovation, 5.0), (MarketShare, -5.0), (Revenue, 5.0)], 0.15, None, None),
        event("new_regulation", "New data protection law", "A new privacy law takes effect and firms must adapt.",
            Neutral, &[(Fairness, 10.0), (Revenue, -8.0), (UserTrust, 12.0)], 0.1, Some(&[Platform]), None),
        event("tech_breakthrough", "Technology breakthrough", "A new AI tool streamlines operations but needs upfront investment.",
            Neutral, &[(Innovation, 15.0), (Revenue, -10.0)], 0.12, None, None),
        event("economic_uncertainty", "Economic uncertainty", "Signs of recession make consumers cut spending.",
            Neutral, &[(Revenue, -10.0), (MarketShare, -5.0), (PublicWelfare, -5.0)], 0.1, None, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn every_role_has_config_and_five_rounds() {
        let catalog = ContentCatalog::builtin();
        for role in Role::ALL {
            let cfg = catalog.role(role).expect("role config");
            assert_eq!(cfg.primary_metrics.len(), 3);
            assert_eq!(catalog.rounds_for(role).len(), 5);
        }
    }

    #[test]
    fn choice_ids_are_unique() {
        let catalog = ContentCatalog::builtin();
        let mut ids: Vec<&str> = catalog
            .rounds
            .values()
            .flatten()
            .flat_map(|r| r.choices.iter().map(|c| c.id.as_str()))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn shuffle_renumbers_and_keeps_choices() {
        let catalog = ContentCatalog::builtin();
        let shuffled = catalog.shuffle_rounds(Role::Platform, &mut SeededRandom::new(11));
        let numbers: Vec<u32> = shuffled.iter().map(|r| r.round_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);

        let mut original: Vec<String> = catalog
            .rounds_for(Role::Platform)
            .iter()
            .flat_map(|r| r.choices.iter().map(|c| c.id.clone()))
            .collect();
        let mut after: Vec<String> = shuffled
            .iter()
            .flat_map(|r| r.choices.iter().map(|c| c.id.clone()))
            .collect();
        original.sort();
        after.sort();
        assert_eq!(original, after);
    }

    #[test]
    fn catalog_survives_json() {
        let catalog = ContentCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: ContentCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }
}
