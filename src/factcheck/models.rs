//! Data models for fact-check sources

use crate::claims::{FactCheckVerdict, SourceFailure};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A candidate fact-check as returned by a source, before similarity scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCandidate {
    pub matched_claim_text: String,
    pub verdict: FactCheckVerdict,
    pub url: String,
    /// Per-candidate credibility; the source default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_credibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_text: Option<String>,
}

impl SourceCandidate {
    pub fn new(matched_claim_text: impl Into<String>, verdict: FactCheckVerdict, url: impl Into<String>) -> Self {
        Self {
            matched_claim_text: matched_claim_text.into(),
            verdict,
            url: url.into(),
            source_credibility: None,
            publisher: None,
            rating_text: None,
        }
    }

    pub fn with_credibility(mut self, credibility: f64) -> Self {
        self.source_credibility = Some(credibility);
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_rating(mut self, rating_text: impl Into<String>) -> Self {
        self.rating_text = Some(rating_text.into());
        self
    }
}

/// Per-source failure; always soft from the engine's point of view
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("upstream error: {0}")]
    UpstreamError(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("circuit breaker open for {0}")]
    CircuitOpen(String),

    #[error("query cancelled")]
    Cancelled,
}

impl SourceError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::Timeout(_) | SourceError::RequestFailed(_) | SourceError::UpstreamError(_)
        )
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Timeout(_) => "timeout",
            SourceError::RequestFailed(_) => "request_failed",
            SourceError::UpstreamError(_) => "upstream_error",
            SourceError::Rejected(_) => "rejected",
            SourceError::InvalidResponse(_) => "invalid_response",
            SourceError::CircuitOpen(_) => "circuit_open",
            SourceError::Cancelled => "cancelled",
        }
    }

    pub fn into_failure(self, source_name: &str) -> SourceFailure {
        SourceFailure {
            source_name: source_name.to_string(),
            reason: self.to_string(),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::RequestFailed(format!("timeout: {}", e))
        } else if e.is_decode() {
            SourceError::InvalidResponse(e.to_string())
        } else {
            SourceError::RequestFailed(e.to_string())
        }
    }
}
