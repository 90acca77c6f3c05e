//! Confidence scorer: fuses pattern signals and fact-check matches into a
//! signed confidence and verdict label

use crate::claims::{FactCheckMatch, PatternSignal, TopicCategory, VerdictLabel};
use crate::error::{Result, VerifyError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fusion weights and label thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_pattern_weight")]
    pub pattern_weight: f64,

    #[serde(default = "default_factcheck_weight")]
    pub factcheck_weight: f64,

    /// Confidence strictly below this is `likely_false`
    #[serde(default = "default_likely_false_below")]
    pub likely_false_below: f64,

    /// Confidence strictly above this is `likely_true`
    #[serde(default = "default_likely_true_above")]
    pub likely_true_above: f64,

    /// Per-topic fact-check weight; the pattern weight becomes its complement
    #[serde(default)]
    pub topic_factcheck_weights: HashMap<TopicCategory, f64>,
}

fn default_pattern_weight() -> f64 {
    0.4
}

fn default_factcheck_weight() -> f64 {
    0.6
}

fn default_likely_false_below() -> f64 {
    -0.3
}

fn default_likely_true_above() -> f64 {
    0.3
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pattern_weight: default_pattern_weight(),
            factcheck_weight: default_factcheck_weight(),
            likely_false_below: default_likely_false_below(),
            likely_true_above: default_likely_true_above(),
            topic_factcheck_weights: HashMap::new(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.pattern_weight) || !unit.contains(&self.factcheck_weight) {
            return Err(VerifyError::Config("scoring weights must be within [0, 1]".into()));
        }
        if (self.pattern_weight + self.factcheck_weight - 1.0).abs() > 1e-6 {
            return Err(VerifyError::Config(format!(
                "scoring weights must sum to 1 (got {} + {})",
                self.pattern_weight, self.factcheck_weight
            )));
        }

        let bounds = -1.0..=1.0;
        if !bounds.contains(&self.likely_false_below) || !bounds.contains(&self.likely_true_above) {
            return Err(VerifyError::Config("label thresholds must be within [-1, 1]".into()));
        }
        if self.likely_false_below > self.likely_true_above {
            return Err(VerifyError::Config(
                "likely_false_below must not exceed likely_true_above".into(),
            ));
        }

        if let Some((topic, weight)) = self
            .topic_factcheck_weights
            .iter()
            .find(|(_, w)| !unit.contains(*w))
        {
            return Err(VerifyError::Config(format!(
                "fact-check weight {} for topic {} outside [0, 1]",
                weight, topic
            )));
        }
        Ok(())
    }

    /// (pattern, fact-check) weights for a topic
    pub fn weights_for(&self, topic: TopicCategory) -> (f64, f64) {
        match self.topic_factcheck_weights.get(&topic) {
            Some(&factcheck) => (1.0 - factcheck, factcheck),
            None => (self.pattern_weight, self.factcheck_weight),
        }
    }
}

/// Intermediate scores for one claim
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub pattern_contribution: f64,
    pub factcheck_contribution: f64,
    pub confidence: f64,
    pub verdict_label: VerdictLabel,
    pub evidence_insufficient: bool,
}

/// Fuses pattern and fact-check evidence into a signed confidence
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a claim; never fails
    ///
    /// Without fact-check evidence the pattern contribution is used alone
    /// instead of being diluted by the fact-check weight.
    pub fn score(
        &self,
        signals: &[PatternSignal],
        matches: &[FactCheckMatch],
        topic: TopicCategory,
    ) -> ScoreBreakdown {
        let pattern = pattern_contribution(signals);
        let factcheck = factcheck_contribution(matches);

        let (confidence, factcheck_contribution, evidence_insufficient) = match factcheck {
            Some(factcheck) => {
                let (pattern_weight, factcheck_weight) = self.config.weights_for(topic);
                (pattern_weight * pattern + factcheck_weight * factcheck, factcheck, false)
            }
            None => (pattern, 0.0, true),
        };
        let confidence = clamp_unit(confidence);

        ScoreBreakdown {
            pattern_contribution: pattern,
            factcheck_contribution,
            confidence,
            verdict_label: self.label(confidence),
            evidence_insufficient,
        }
    }

    pub fn label(&self, confidence: f64) -> VerdictLabel {
        if confidence < self.config.likely_false_below {
            VerdictLabel::LikelyFalse
        } else if confidence > self.config.likely_true_above {
            VerdictLabel::LikelyTrue
        } else {
            VerdictLabel::Uncertain
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Sum of signal weights, clamped to [-1, 1]
pub fn pattern_contribution(signals: &[PatternSignal]) -> f64 {
    clamp_unit(signals.iter().map(|s| s.weight).sum())
}

/// Evidence-weighted mean verdict value; `None` when there is no usable evidence
pub fn factcheck_contribution(matches: &[FactCheckMatch]) -> Option<f64> {
    let total_weight: f64 = matches.iter().map(FactCheckMatch::evidence_weight).sum();
    if matches.is_empty() || total_weight <= 0.0 {
        return None;
    }

    let weighted: f64 = matches
        .iter()
        .map(|m| m.evidence_weight() * m.verdict.value())
        .sum();
    Some(clamp_unit(weighted / total_weight))
}
