//! Market Trial kernel: mentor table.

use crate::domain::MentorType;
use crate::metrics::{Metric, MetricDelta};
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy)]
pub struct MentorSpec {
    pub kind: MentorType,
    pub name: &'static str,
    pub title: &'static str,
    pub boost: [(Metric, f64); 2],
    pub advice: &'static [&'static str],
}

const ECONOMIST_ADVICE: &[&str] = &[
    "Weigh short-term growth against long-term sustainability. Profit is not everything.",
    "A large market share is not a monopoly. Compete fairly so the market stays healthy.",
    "Investing in product quality pays back more than competing on price.",
    "Customer trust is priceless. Do not trade it for a quick win.",
    "When the market turns hard, innovate rather than only cutting costs.",
    "Healthy competition creates value for the whole of society.",
    "Low cost is not always an advantage. Added value is what counts.",
];

const TECH_EXPERT_ADVICE: &[&str] = &[
    "Technology should serve people. Put users first.",
    "Innovation does not mean breaking every rule. Create responsibly.",
    "User data must be protected. Transparency is the key.",
    "AI and automation need ethics and social responsibility alongside them.",
    "A strong platform must not abuse its position. Build a fair ecosystem.",
    "Security is not a side feature. It is the foundation of trust.",
    "Good user experience is about safety, not only a pretty interface.",
];

const POLICY_MAKER_ADVICE: &[&str] = &[
    "Regulation is not a barrier. It protects every party in the market.",
    "Balancing innovation and safety is the art of good governance.",
    "Fair competition builds a market where everyone has a chance.",
    "Public welfare is an investment in a sustainable future, not a cost.",
    "Transparent rules help firms understand and comply.",
    "Good regulation steers innovation rather than blocking it.",
    "Protecting small firms protects the diversity of the market.",
];

pub static MENTORS: [MentorSpec; 3] = [
    MentorSpec {
        kind: MentorType::Economist,
        name: "Dr. Minh Tuan",
        title: "Economist",
        boost: [(Metric::Revenue, 5.0), (Metric::MarketShare, 5.0)],
        advice: ECONOMIST_ADVICE,
    },
    MentorSpec {
        kind: MentorType::TechExpert,
        name: "Ms. Hai Yen",
        title: "Technology Expert",
        boost: [(Metric::Innovation, 5.0), (Metric::UserTrust, 5.0)],
        advice: TECH_EXPERT_ADVICE,
    },
    MentorSpec {
        kind: MentorType::PolicyMaker,
        name: "Mr. Van Duc",
        title: "Policy Expert",
        boost: [(Metric::Fairness, 5.0), (Metric::PublicWelfare, 5.0)],
        advice: POLICY_MAKER_ADVICE,
    },
];

pub fn mentor_spec(kind: MentorType) -> &'static MentorSpec {
    match kind {
        MentorType::Economist => &MENTORS[0],
        MentorType::TechExpert => &MENTORS[1],
        MentorType::PolicyMaker => &MENTORS[2],
    }
}

/// Starting bonus granted by a mentor, as a sparse delta.
pub fn mentor_boost(kind: MentorType) -> MetricDelta {
    mentor_spec(kind)
        .boost
        .iter()
        .fold(MetricDelta::new(), |d, &(m, v)| d.with(m, v))
}

/// One line of advice drawn uniformly from the mentor's pool.
pub fn mentor_advice(kind: MentorType, rng: &mut dyn RandomSource) -> &'static str {
    let pool = mentor_spec(kind).advice;
    pool[rng.next_index(pool.len())]
}

/// Whether a mentor speaks up in `round` (1-based).
pub fn is_advice_round(round: u32, frequency: u32) -> bool {
    frequency > 0 && round > 0 && round % frequency == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn boosts_touch_two_metrics() {
        let d = mentor_boost(MentorType::TechExpert);
        assert_eq!(d.get(Metric::Innovation), Some(5.0));
        assert_eq!(d.get(Metric::UserTrust), Some(5.0));
        assert_eq!(d.iter().count(), 2);
    }

    #[test]
    fn advice_comes_from_the_pool() {
        let mut rng = ScriptedRandom::new(vec![0.0, 0.99]);
        assert_eq!(mentor_advice(MentorType::Economist, &mut rng), ECONOMIST_ADVICE[0]);
        assert_eq!(
            mentor_advice(MentorType::Economist, &mut rng),
            ECONOMIST_ADVICE[ECONOMIST_ADVICE.len() - 1]
        );
    }

    #[test]
    fn advice_every_second_round() {
        let rounds: Vec<u32> = (1..=5).filter(|r| is_advice_round(*r, 2)).collect();
        assert_eq!(rounds, vec![2, 4]);
        assert!(!is_advice_round(3, 0));
    }
}
