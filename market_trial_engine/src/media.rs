//! Market Trial kernel: media headlines.
//!
//! The orchestrator treats headline generation as a black box behind
//! `HeadlineGenerator`. `TemplateHeadlines` is the shipped implementation.

use crate::domain::{Choice, MediaHeadline, Role, Sentiment, StrategyTag};
use crate::metrics::Metrics;
use crate::random::RandomSource;

pub trait HeadlineGenerator: Send + Sync {
    /// Produce the headline for `round` after `choice`, read against the
    /// metrics left by the round (events included).
    fn generate(
        &self,
        role: Role,
        round: u32,
        choice: &Choice,
        metrics: &Metrics,
        rng: &mut dyn RandomSource,
    ) -> MediaHeadline;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlineTemplate {
    pub text: &'static str,
    pub sentiment: Sentiment,
    pub reputation_impact: i64,
}

const fn t(text: &'static str, sentiment: Sentiment, reputation_impact: i64) -> HeadlineTemplate {
    HeadlineTemplate {
        text,
        sentiment,
        reputation_impact,
    }
}

use Sentiment::{Negative, Neutral, Positive};

const FALLBACK: [HeadlineTemplate; 2] = [
    t("A new move in a crowded, competitive market", Neutral, 3),
    t("The market watches closely for the next step", Neutral, 2),
];

/// Role- and tag-conditioned templates, picked uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateHeadlines;

impl TemplateHeadlines {
    /// Every template whose condition holds. Falls back to generic lines.
    pub fn candidates(role: Role, choice: &Choice, m: &Metrics) -> Vec<HeadlineTemplate> {
        let tags = choice.effective_tags();
        let has = |tag: StrategyTag| tags.contains(&tag);
        let innovative = has(StrategyTag::Innovation);
        let aggressive = has(StrategyTag::Aggressive);
        let defensive = has(StrategyTag::Defensive);
        let ethical = has(StrategyTag::Ethical);

        let mut out = Vec::new();
        match role {
            Role::SmallBiz => {
                if innovative && m.innovation > 70.0 {
                    out.push(t("Small firm breaks through with a bold new idea", Positive, 15));
                    out.push(t("Local startup impresses with a creative solution", Positive, 12));
                }
                if aggressive && m.revenue > 75.0 {
                    out.push(t("Small business takes on the giants with a daring play", Neutral, 5));
                    out.push(t("Strong strategy drives a small firm's rapid growth", Positive, 10));
                }
                if defensive && m.user_trust > 70.0 {
                    out.push(t("Small business doubles down on loyal customers", Positive, 8));
                    out.push(t("Defensive strategy keeps a small firm steady", Neutral, 5));
                }
                if ethical && m.user_trust > 75.0 {
                    out.push(t("Customers trust a small firm's commitment to quality", Positive, 18));
                    out.push(t("Business ethics: the small firm's secret weapon", Positive, 15));
                }
                if m.revenue < 40.0 {
                    out.push(t("Small business struggles in a cut-throat market", Negative, -10));
                    out.push(t("Heavy pressure from rivals squeezes a small firm", Negative, -8));
                }
            }
            Role::Platform => {
                if innovative && m.innovation > 75.0 {
                    out.push(t("Platform launches a breakthrough AI feature", Positive, 20));
                    out.push(t("Relentless innovation keeps the platform on top", Positive, 18));
                }
                if aggressive && m.market_share > 80.0 {
                    out.push(t("Platform's rapid expansion raises monopoly fears", Negative, -15));
                    out.push(t("Digital platform pursues aggressive growth", Neutral, 5));
                }
                if defensive && m.user_trust > 75.0 {
                    out.push(t("Platform tightens security after a leak", Neutral, 4));
                    out.push(t("Platform puts a safe user experience first", Positive, 10));
                }
                if ethical && m.user_trust > 80.0 {
                    out.push(t("Platform pledges absolute protection of user data", Positive, 22));
                    out.push(t("Transparency and ethics at the platform's core", Positive, 20));
                }
                if m.fairness < 40.0 {
                    out.push(t("Regulator probes claims of dominance abuse", Negative, -25));
                    out.push(t("Platform faces pressure over fair competition", Negative, -20));
                }
            }
            Role::Regulator => {
                if innovative && m.innovation > 70.0 {
                    out.push(t("Regulator adopts AI to monitor the market", Positive, 15));
                    out.push(t("Smart regulation: a new approach from the authority", Positive, 12));
                }
                if aggressive && m.fairness > 75.0 {
                    out.push(t("Tough measures secure fair competition", Positive, 18));
                    out.push(t("Regulator fines competition violations hard", Neutral, 8));
                }
                if defensive && m.public_welfare > 70.0 {
                    out.push(t("Rules protecting small firms are welcomed", Positive, 12));
                    out.push(t("Regulator balances innovation and safety", Neutral, 6));
                }
                if ethical && m.public_welfare > 75.0 {
                    out.push(t("New policy puts social welfare and sustainability first", Positive, 20));
                    out.push(t("Rules for the public good earn high marks", Positive, 18));
                }
                if m.public_welfare < 40.0 {
                    out.push(t("Public criticises ineffective policy", Negative, -15));
                    out.push(t("Regulator blamed for slow action", Negative, -12));
                }
            }
        }

        if out.is_empty() {
            out.extend_from_slice(&FALLBACK);
        }
        out
    }
}

impl HeadlineGenerator for TemplateHeadlines {
    fn generate(
        &self,
        role: Role,
        round: u32,
        choice: &Choice,
        metrics: &Metrics,
        rng: &mut dyn RandomSource,
    ) -> MediaHeadline {
        let candidates = Self::candidates(role, choice, metrics);
        let picked = candidates[rng.next_index(candidates.len())];
        MediaHeadline {
            round,
            headline: picked.text.to_string(),
            sentiment: picked.sentiment,
            reputation_impact: picked.reputation_impact,
        }
    }
}

/// Sum of reputation impacts across a game's headlines.
pub fn media_impact(headlines: &[MediaHeadline]) -> i64 {
    headlines.iter().map(|h| h.reputation_impact).sum()
}
