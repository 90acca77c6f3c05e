//! Pattern rule table and matchers
//!
//! Each rule is an independent predicate with a fixed weight. The table is
//! plain data so rules can be configured, added and tested in isolation.

use crate::claims::TopicCategory;
use crate::error::{Result, VerifyError};
use crate::text::{self, PhraseIndex};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

const SUPERLATIVES: &[&str] = &[
    "best", "worst", "greatest", "biggest", "largest", "deadliest", "most", "least", "ultimate",
    "unprecedented", "incredible", "unbelievable", "amazing", "absolutely", "totally",
    "completely", "perfect", "massive", "huge", "extreme", "extremely", "everyone", "nobody",
    "always", "never", "all",
];

/// Matcher definition as it appears in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherDef {
    /// Whole-phrase keyword presence
    Keywords {
        phrases: Vec<String>,
        #[serde(default = "default_min_hits")]
        min_hits: usize,
    },
    /// Regular expression, case-insensitive unless the pattern opts out with `(?-i)`
    Regex { pattern: String },
    /// Share of all-caps words
    Capitalization { min_ratio: f64, min_words: usize },
    /// Superlatives and intensifiers per word
    SuperlativeDensity { min_ratio: f64, min_hits: usize },
    /// Emphatic `!` / `?` usage
    Punctuation { min_count: usize },
}

fn default_min_hits() -> usize {
    1
}

/// A configured pattern rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRuleDef {
    pub name: String,
    pub weight: f64,
    pub matcher: MatcherDef,
    /// Topics this rule is restricted to; empty means every topic
    #[serde(default)]
    pub topics: Vec<TopicCategory>,

    /// Skip the rule when the text contains a negation ("does not cure")
    #[serde(default)]
    pub unless_negated: bool,
}

impl PatternRuleDef {
    fn keywords(name: &str, weight: f64, phrases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight,
            matcher: MatcherDef::Keywords {
                phrases: phrases.iter().map(|p| p.to_string()).collect(),
                min_hits: 1,
            },
            topics: Vec::new(),
            unless_negated: false,
        }
    }

    fn regex(name: &str, weight: f64, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            weight,
            matcher: MatcherDef::Regex {
                pattern: pattern.to_string(),
            },
            topics: Vec::new(),
            unless_negated: false,
        }
    }

    fn heuristic(name: &str, weight: f64, matcher: MatcherDef) -> Self {
        Self {
            name: name.to_string(),
            weight,
            matcher,
            topics: Vec::new(),
            unless_negated: false,
        }
    }

    fn for_topics(mut self, topics: &[TopicCategory]) -> Self {
        self.topics = topics.to_vec();
        self
    }

    fn unless_negated(mut self) -> Self {
        self.unless_negated = true;
        self
    }

    /// Check ranges and thresholds
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VerifyError::Config("pattern rule name cannot be empty".to_string()));
        }
        if !self.weight.is_finite() || !(-1.0..=1.0).contains(&self.weight) {
            return Err(VerifyError::Config(format!(
                "pattern rule {} weight {} outside [-1, 1]",
                self.name, self.weight
            )));
        }

        let valid = match &self.matcher {
            MatcherDef::Keywords { phrases, min_hits } => !phrases.is_empty() && *min_hits > 0,
            MatcherDef::Regex { pattern } => !pattern.is_empty(),
            MatcherDef::Capitalization { min_ratio, min_words } => {
                (0.0..=1.0).contains(min_ratio) && *min_words > 0
            }
            MatcherDef::SuperlativeDensity { min_ratio, min_hits } => {
                (0.0..=1.0).contains(min_ratio) && *min_hits > 0
            }
            MatcherDef::Punctuation { min_count } => *min_count > 0,
        };

        if !valid {
            return Err(VerifyError::Config(format!(
                "pattern rule {} has an invalid matcher",
                self.name
            )));
        }
        Ok(())
    }
}

/// Default rule table
pub fn default_rules() -> Vec<PatternRuleDef> {
    use TopicCategory::Health;

    vec![
        PatternRuleDef::regex(
            "dangerous_health_claim",
            -0.8,
            r"\b(?:drink(?:ing)?|inject(?:ing)?|ingest(?:ing)?|swallow(?:ing)?|gargl(?:e|ing))\b.{0,40}\b(?:bleach|chlorine dioxide|disinfectants?|turpentine|hydrogen peroxide|methanol|mms)\b|\b(?:bleach|disinfectants?|chlorine dioxide|turpentine)\b.{0,40}\b(?:cures?|kills?|treats?|prevents?)\b",
        )
        .for_topics(&[Health])
        .unless_negated(),
        PatternRuleDef::keywords(
            "miracle_cure",
            -0.5,
            &[
                "miracle cure", "miracle treatment", "secret cure", "cure all", "cures everything",
                "natural cure", "doctors hate", "what doctors won't tell you", "cures cancer",
                "100% cure",
            ],
        )
        .for_topics(&[Health]),
        PatternRuleDef::keywords(
            "conspiracy_framing",
            -0.4,
            &[
                "they don't want you to know", "what they aren't telling you",
                "mainstream media won't report", "cover-up", "cover up", "deep state",
                "government conspiracy", "the elites", "follow the money", "they've been hiding",
                "suppressed knowledge", "they hid this", "they deleted this",
                "banned information", "censored",
            ],
        ),
        PatternRuleDef::keywords(
            "sensational_language",
            -0.3,
            &[
                "shocking truth", "mind-blowing", "bombshell", "huge scandal", "truth bomb",
                "wake up", "open your eyes", "stop being blind", "sheeple", "sheep",
                "the truth about",
            ],
        ),
        PatternRuleDef::keywords(
            "emotional_appeal",
            -0.3,
            &[
                "you won't believe", "outrageous", "terrifying", "horrifying", "disgusting",
                "shocking", "share before", "before it's deleted", "before it gets deleted",
                "share this", "must see", "furious",
            ],
        ),
        PatternRuleDef::keywords(
            "distrust_of_authority",
            -0.3,
            &[
                "do your own research", "they are lying", "fake news media", "corrupt officials",
                "big pharma", "mainstream media", "so-called experts", "don't trust",
            ],
        ),
        PatternRuleDef::regex(
            "absolutist_language",
            -0.25,
            r"\b(?:100% (?:proof|proven|true|guaranteed)|undeniable|irrefutable|proven fact|everyone knows|without a doubt|guaranteed to|always works|never fails)\b",
        ),
        PatternRuleDef::regex(
            "missing_attribution",
            -0.2,
            r"\b(?:some|many|most) (?:people|experts|scientists|doctors|sources) (?:say|said|believe|claim|agree)\b|\bit is (?:said|known|believed|rumou?red) that\b|\b(?:sources|insiders) say\b|\bpeople are saying\b|\brumou?r has it\b",
        ),
        PatternRuleDef::heuristic(
            "excessive_capitalization",
            -0.2,
            MatcherDef::Capitalization {
                min_ratio: 0.3,
                min_words: 3,
            },
        ),
        PatternRuleDef::heuristic(
            "excessive_punctuation",
            -0.15,
            MatcherDef::Punctuation { min_count: 2 },
        ),
        PatternRuleDef::heuristic(
            "superlative_density",
            -0.2,
            MatcherDef::SuperlativeDensity {
                min_ratio: 0.15,
                min_hits: 2,
            },
        ),
        PatternRuleDef::keywords(
            "cited_research",
            0.3,
            &[
                "according to research", "studies show", "evidence suggests",
                "researchers found", "data indicates", "peer-reviewed", "scientific consensus",
                "based on data", "statistics show", "research published", "clinical trials",
                "survey results", "official statistics", "multiple sources confirm",
                "according to the report", "fact-checked", "investigation revealed",
                "findings suggest", "public records show", "independently verified",
                "research indicates", "the study concludes",
            ],
        ),
        PatternRuleDef::regex(
            "named_source_attribution",
            0.2,
            r"\b(?:according to|reported by|published in|confirmed by) (?:the )?(?-i:[A-Z][A-Za-z&.\-]+)",
        ),
    ]
}

/// Compiled matcher
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Keywords { phrases: Vec<String>, min_hits: usize },
    Regex(Regex),
    Capitalization { min_ratio: f64, min_words: usize },
    SuperlativeDensity { min_ratio: f64, min_hits: usize },
    Punctuation { min_count: usize },
}

impl Matcher {
    pub(crate) fn compile(def: &MatcherDef) -> Result<Self> {
        Ok(match def {
            MatcherDef::Keywords { phrases, min_hits } => Matcher::Keywords {
                phrases: phrases.clone(),
                min_hits: *min_hits,
            },
            MatcherDef::Regex { pattern } => Matcher::Regex(
                RegexBuilder::new(pattern).case_insensitive(true).build()?,
            ),
            MatcherDef::Capitalization { min_ratio, min_words } => Matcher::Capitalization {
                min_ratio: *min_ratio,
                min_words: *min_words,
            },
            MatcherDef::SuperlativeDensity { min_ratio, min_hits } => {
                Matcher::SuperlativeDensity {
                    min_ratio: *min_ratio,
                    min_hits: *min_hits,
                }
            }
            MatcherDef::Punctuation { min_count } => Matcher::Punctuation {
                min_count: *min_count,
            },
        })
    }

    /// Evaluate against the text; returns the evidence excerpt when it fires
    pub(crate) fn evaluate(&self, text: &str, index: &PhraseIndex) -> Option<String> {
        match self {
            Matcher::Keywords { phrases, min_hits } => {
                let hits = index.hits(phrases);
                (hits.len() >= *min_hits).then(|| hits.join(", "))
            }
            Matcher::Regex(regex) => regex.find(text).map(|m| m.as_str().to_string()),
            Matcher::Capitalization { min_ratio, min_words } => {
                capitalization(text, *min_ratio, *min_words)
            }
            Matcher::SuperlativeDensity { min_ratio, min_hits } => {
                superlative_density(text, *min_ratio, *min_hits)
            }
            Matcher::Punctuation { min_count } => punctuation(text, *min_count),
        }
    }
}

fn capitalization(text: &str, min_ratio: f64, min_words: usize) -> Option<String> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphabetic()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }

    let caps: Vec<&str> = words
        .iter()
        .filter(|w| w.chars().count() >= 2 && w.chars().all(char::is_uppercase))
        .map(String::as_str)
        .collect();
    let ratio = caps.len() as f64 / words.len() as f64;

    (caps.len() >= min_words && ratio >= min_ratio).then(|| caps.join(" "))
}

fn superlative_density(text: &str, min_ratio: f64, min_hits: usize) -> Option<String> {
    let words = text::words(text);
    if words.is_empty() {
        return None;
    }

    let hits: Vec<&str> = words
        .iter()
        .filter(|w| SUPERLATIVES.contains(&w.as_str()))
        .map(String::as_str)
        .collect();
    let ratio = hits.len() as f64 / words.len() as f64;

    (hits.len() >= min_hits && ratio >= min_ratio).then(|| hits.join(", "))
}

fn punctuation(text: &str, min_count: usize) -> Option<String> {
    let exclamations = text.chars().filter(|c| *c == '!').count();

    let mut longest = String::new();
    let mut run = String::new();
    for c in text.chars() {
        if c == '!' || c == '?' {
            run.push(c);
            if run.chars().count() > longest.chars().count() {
                longest = run.clone();
            }
        } else {
            run.clear();
        }
    }

    if longest.chars().count() >= min_count {
        Some(longest)
    } else if exclamations >= min_count {
        Some(format!("{} exclamation marks", exclamations))
    } else {
        None
    }
}
