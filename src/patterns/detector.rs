//! Pattern detector: evaluates the rule registry against claim text

use super::rules::{default_rules, Matcher, PatternRuleDef};
use crate::claims::{PatternSignal, TopicCategory};
use crate::error::{Result, VerifyError};
use crate::text::{is_negated, PhraseIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Pattern detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<PatternRuleDef>,

    /// Evidence excerpts are cut to this many characters
    #[serde(default = "default_max_excerpt_chars")]
    pub max_excerpt_chars: usize,
}

fn default_max_excerpt_chars() -> usize {
    120
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            max_excerpt_chars: default_max_excerpt_chars(),
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !names.insert(rule.name.as_str()) {
                return Err(VerifyError::Config(format!(
                    "duplicate pattern rule name: {}",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    weight: f64,
    topics: Vec<TopicCategory>,
    unless_negated: bool,
    matcher: Matcher,
}

impl CompiledRule {
    fn applies_to(&self, topic: Option<TopicCategory>) -> bool {
        match topic {
            Some(topic) => self.topics.is_empty() || self.topics.contains(&topic),
            None => true,
        }
    }
}

/// Scans claim text for misinformation-indicative signals
#[derive(Debug, Clone)]
pub struct PatternDetector {
    rules: Vec<CompiledRule>,
    max_excerpt_chars: usize,
}

impl PatternDetector {
    /// Validate and compile the configured rule table
    pub fn new(config: &PatternConfig) -> Result<Self> {
        config.validate()?;

        let rules = config
            .rules
            .iter()
            .map(|def| {
                Ok(CompiledRule {
                    name: def.name.clone(),
                    weight: def.weight,
                    topics: def.topics.clone(),
                    unless_negated: def.unless_negated,
                    matcher: Matcher::compile(&def.matcher)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            max_excerpt_chars: config.max_excerpt_chars,
        })
    }

    /// Detect signals in registry order
    ///
    /// Topic-scoped rules only run for their topics; with no topic every
    /// rule runs. An empty result is neutral evidence.
    pub fn detect(&self, text: &str, topic: Option<TopicCategory>) -> Vec<PatternSignal> {
        let index = PhraseIndex::new(text);
        let negated = is_negated(text);

        let signals: Vec<PatternSignal> = self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(topic))
            .filter(|rule| !(negated && rule.unless_negated))
            .filter_map(|rule| {
                rule.matcher.evaluate(text, &index).map(|excerpt| PatternSignal {
                    name: rule.name.clone(),
                    weight: rule.weight,
                    evidence_excerpt: excerpt.chars().take(self.max_excerpt_chars).collect(),
                })
            })
            .collect();

        debug!("Detected {} pattern signals", signals.len());
        signals
    }

    /// Names of registered rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}
