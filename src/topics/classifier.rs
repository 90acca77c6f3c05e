//! Rule-based topic classification

use crate::claims::TopicCategory;
use crate::error::{Result, VerifyError};
use crate::text::PhraseIndex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One topic rule: a keyword set and the hits needed to claim the topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRule {
    pub topic: TopicCategory,
    pub keywords: Vec<String>,
    #[serde(default = "default_min_hits")]
    pub min_hits: usize,
}

fn default_min_hits() -> usize {
    1
}

impl TopicRule {
    pub fn new(topic: TopicCategory, keywords: &[&str], min_hits: usize) -> Self {
        Self {
            topic,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            min_hits,
        }
    }
}

/// Topic classifier configuration
///
/// Rules are evaluated in declaration order; the first rule reaching its
/// `min_hits` wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<TopicRule>,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl TopicConfig {
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if rule.min_hits == 0 {
                return Err(VerifyError::Config(format!(
                    "topic rule for {} must require at least one hit",
                    rule.topic
                )));
            }
            if rule.keywords.is_empty() {
                return Err(VerifyError::Config(format!(
                    "topic rule for {} has no keywords",
                    rule.topic
                )));
            }
        }
        Ok(())
    }
}

fn default_rules() -> Vec<TopicRule> {
    vec![
        TopicRule::new(
            TopicCategory::Health,
            &[
                "health", "cure", "cures", "cured", "disease", "diseases", "treatment",
                "medicine", "medical", "doctor", "doctors", "vaccine", "vaccines",
                "vaccination", "covid", "coronavirus", "pandemic", "virus", "cancer", "drug",
                "drugs", "hospital", "immune", "infection", "diet", "bleach", "autism",
                "big pharma",
            ],
            1,
        ),
        TopicRule::new(
            TopicCategory::Politics,
            &[
                "politics", "political", "government", "election", "elections", "democrat",
                "democrats", "republican", "republicans", "congress", "senate", "president",
                "vote", "votes", "voting", "voter", "ballot", "ballots", "campaign",
                "parliament", "minister", "deep state", "rigged",
            ],
            1,
        ),
        TopicRule::new(
            TopicCategory::Science,
            &[
                "science", "scientific", "scientist", "scientists", "climate", "global warming",
                "carbon", "emissions", "earth", "moon", "moon landing", "nasa", "space",
                "planet", "physics", "evolution", "chemtrails", "chemtrail", "flat earth",
            ],
            1,
        ),
        TopicRule::new(
            TopicCategory::Technology,
            &[
                "5g", "technology", "internet", "artificial intelligence", "ai", "microchip",
                "microchips", "smartphone", "phone", "phones", "computer", "software",
                "radiation", "wifi", "tracking device",
            ],
            1,
        ),
        TopicRule::new(
            TopicCategory::Economy,
            &[
                "economy", "economic", "inflation", "tax", "taxes", "jobs", "unemployment",
                "gdp", "stock market", "recession", "wages", "interest rates", "bank", "banks",
            ],
            1,
        ),
    ]
}

/// Assigns exactly one topic to a claim
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    rules: Vec<TopicRule>,
}

impl TopicClassifier {
    pub fn new(config: &TopicConfig) -> Self {
        Self {
            rules: config.rules.clone(),
        }
    }

    /// Classify normalized claim text; falls back to `General`
    pub fn classify(&self, text: &str) -> TopicCategory {
        let index = PhraseIndex::new(text);

        for rule in &self.rules {
            let hits = index.hits(&rule.keywords).len();
            if hits >= rule.min_hits {
                debug!("Topic {} matched with {} keyword hits", rule.topic, hits);
                return rule.topic;
            }
        }

        TopicCategory::General
    }
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(&TopicConfig::default())
    }
}
