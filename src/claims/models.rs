//! Data models for claims and verification results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single atomic claim, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub raw_text: String,
    pub normalized_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub fingerprint: String,
}

impl Claim {
    /// Create a new claim from its raw and normalized text
    pub fn new(raw_text: String, normalized_text: String, source_url: Option<String>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let fingerprint = Self::compute_fingerprint(&normalized_text);

        Self {
            id,
            raw_text,
            normalized_text,
            source_url,
            submitted_at: Utc::now(),
            fingerprint,
        }
    }

    /// Content hash of the normalized text, case-insensitive
    pub fn compute_fingerprint(normalized_text: &str) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(normalized_text.to_lowercase().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Topic assigned to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    Health,
    Politics,
    Science,
    Technology,
    Economy,
    General,
}

impl TopicCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicCategory::Health => "health",
            TopicCategory::Politics => "politics",
            TopicCategory::Science => "science",
            TopicCategory::Technology => "technology",
            TopicCategory::Economy => "economy",
            TopicCategory::General => "general",
        }
    }
}

impl fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected linguistic pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSignal {
    pub name: String,
    /// Weight in [-1, 1]; negative indicates misinformation
    pub weight: f64,
    pub evidence_excerpt: String,
}

/// Verdict reported by a fact-check source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactCheckVerdict {
    True,
    False,
    Mixed,
    Unverified,
}

impl FactCheckVerdict {
    /// Numeric value used when fusing fact-check evidence
    pub fn value(&self) -> f64 {
        match self {
            FactCheckVerdict::True => 1.0,
            FactCheckVerdict::False => -1.0,
            FactCheckVerdict::Mixed | FactCheckVerdict::Unverified => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FactCheckVerdict::True => "true",
            FactCheckVerdict::False => "false",
            FactCheckVerdict::Mixed => "mixed",
            FactCheckVerdict::Unverified => "unverified",
        }
    }
}

/// A fact-check that matched the claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckMatch {
    pub source_name: String,
    /// Credibility in [0, 1]
    pub source_credibility: f64,
    pub matched_claim_text: String,
    pub verdict: FactCheckVerdict,
    /// Similarity to the claim in [0, 1]
    pub similarity: f64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_text: Option<String>,
}

impl FactCheckMatch {
    /// Ranking and fusion weight
    pub fn evidence_weight(&self) -> f64 {
        self.similarity * self.source_credibility
    }
}

/// Bucketed verdict derived from confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictLabel {
    LikelyFalse,
    Uncertain,
    LikelyTrue,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::LikelyFalse => "likely_false",
            VerdictLabel::Uncertain => "uncertain",
            VerdictLabel::LikelyTrue => "likely_true",
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact-check source that could not contribute evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_name: String,
    pub reason: String,
}

/// Terminal verification report for one claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub claim_id: String,
    pub claim_text: String,
    pub topic: TopicCategory,
    pub signals: Vec<PatternSignal>,
    pub matches: Vec<FactCheckMatch>,
    /// Confidence in [-1, 1]; negative means likely false
    pub confidence: f64,
    pub verdict_label: VerdictLabel,
    pub rationale: String,
    pub pattern_contribution: f64,
    pub factcheck_contribution: f64,
    pub evidence_insufficient: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable_sources: Vec<SourceFailure>,
    pub verified_at: DateTime<Utc>,
}
