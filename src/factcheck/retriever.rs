//! Fact-check retriever: concurrent fan-out over all configured sources

use super::circuit_breaker::{BreakerStats, CircuitBreaker, CircuitBreakerConfig};
use super::models::{SourceCandidate, SourceError};
use super::retry::RetryPolicy;
use super::source::FactCheckSource;
use crate::claims::{Claim, FactCheckMatch, SourceFailure};
use crate::error::{Result as VerifyResult, VerifyError};
use crate::metrics::METRICS;
use crate::text::{content_terms, dice, polarity_differs};
use futures::future::join_all;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Per-source timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Candidates below this similarity are discarded
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    #[serde(default = "default_max_matches")]
    pub max_matches: usize,

    /// Retries for transient HTTP failures
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,

    #[serde(default = "default_breaker_failures")]
    pub circuit_breaker_failures: usize,

    #[serde(default = "default_breaker_reset_secs")]
    pub circuit_breaker_reset_secs: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_min_similarity() -> f64 {
    0.4
}

fn default_max_matches() -> usize {
    10
}

fn default_retry_attempts() -> usize {
    2
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_cache_max_entries() -> u64 {
    1000
}

fn default_breaker_failures() -> usize {
    5
}

fn default_breaker_reset_secs() -> u64 {
    30
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            min_similarity: default_min_similarity(),
            max_matches: default_max_matches(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            circuit_breaker_failures: default_breaker_failures(),
            circuit_breaker_reset_secs: default_breaker_reset_secs(),
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Client timeout for one HTTP attempt, so every retry and its backoff
    /// fit inside the per-source `timeout`
    pub fn attempt_timeout(&self) -> Duration {
        let policy = self.retry_policy();
        let backoff: Duration = (1..=self.retry_attempts)
            .map(|attempt| policy.backoff_for(attempt))
            .sum();
        let slots = u32::try_from(self.retry_attempts + 1).unwrap_or(u32::MAX);

        let budget = self.timeout().saturating_sub(backoff);
        if budget.is_zero() {
            self.timeout() / slots
        } else {
            budget / slots
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.circuit_breaker_failures,
            reset_timeout: Duration::from_secs(self.circuit_breaker_reset_secs),
        }
    }

    pub fn validate(&self) -> VerifyResult<()> {
        if self.timeout_ms == 0 {
            return Err(VerifyError::Config("retrieval.timeout_ms must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(VerifyError::Config(
                "retrieval.min_similarity must be within [0, 1]".into(),
            ));
        }
        if self.max_matches == 0 {
            return Err(VerifyError::Config("retrieval.max_matches must be > 0".into()));
        }
        if self.circuit_breaker_failures == 0 {
            return Err(VerifyError::Config(
                "retrieval.circuit_breaker_failures must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Retrieval fails as a whole only when no source could answer
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("all {} fact-check sources unavailable", failures.len())]
    AllSourcesUnavailable { failures: Vec<SourceFailure> },
}

/// Merged result of one retrieval
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Ranked by `similarity * credibility`, best first
    pub matches: Vec<FactCheckMatch>,
    pub failures: Vec<SourceFailure>,
    pub sources_queried: usize,
    pub from_cache: bool,
}

/// Queries every source concurrently and ranks the merged matches
pub struct FactCheckRetriever {
    sources: Vec<Arc<dyn FactCheckSource>>,
    config: RetrievalConfig,
    breaker: CircuitBreaker,
    cache: Cache<String, Arc<Vec<FactCheckMatch>>>,
}

impl FactCheckRetriever {
    pub fn new(sources: Vec<Arc<dyn FactCheckSource>>, config: RetrievalConfig) -> Self {
        let breaker = CircuitBreaker::new(config.breaker_config());
        let cache = Cache::builder()
            .max_capacity(config.cache_max_entries)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            sources,
            config,
            breaker,
            cache,
        }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn breaker_stats(&self, source: &str) -> BreakerStats {
        self.breaker.stats(source)
    }

    /// Retrieve ranked matches for a claim
    ///
    /// Per-source errors are soft and reported in `failures`. The call fails
    /// only when every configured source failed. With no sources configured
    /// the outcome is empty.
    pub async fn retrieve(
        &self,
        claim_text: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<RetrievalOutcome, RetrievalError> {
        if self.sources.is_empty() {
            debug!("No fact-check sources configured");
            return Ok(RetrievalOutcome::default());
        }

        let key = Claim::compute_fingerprint(claim_text);
        if let Some(matches) = self.cache.get(&key).await {
            METRICS.record_cache(true);
            debug!("Retrieval cache hit");
            return Ok(RetrievalOutcome {
                matches: matches.as_ref().clone(),
                failures: Vec::new(),
                sources_queried: self.sources.len(),
                from_cache: true,
            });
        }
        METRICS.record_cache(false);

        let claim_terms = content_terms(claim_text);
        let queries = self
            .sources
            .iter()
            .map(|source| self.query_source(source.as_ref(), claim_text, cancel));
        let responses = join_all(queries).await;

        let mut matches = Vec::new();
        let mut failures = Vec::new();
        for (source, response) in self.sources.iter().zip(responses) {
            match response {
                Ok(candidates) => {
                    matches.extend(self.score_candidates(
                        source.as_ref(),
                        claim_text,
                        &claim_terms,
                        candidates,
                    ));
                }
                Err(e) => failures.push(e.into_failure(source.name())),
            }
        }

        if failures.len() == self.sources.len() {
            warn!("All {} fact-check sources unavailable", failures.len());
            return Err(RetrievalError::AllSourcesUnavailable { failures });
        }

        let matches = rank_matches(matches, self.config.max_matches);
        info!(
            "Retrieved {} matches from {} sources ({} unavailable)",
            matches.len(),
            self.sources.len(),
            failures.len()
        );

        // Partial outcomes are not cached so a recovered source is asked again
        if failures.is_empty() {
            self.cache.insert(key, Arc::new(matches.clone())).await;
        }

        Ok(RetrievalOutcome {
            matches,
            failures,
            sources_queried: self.sources.len(),
            from_cache: false,
        })
    }

    /// One source query bounded by the breaker, the timeout and the cancel token
    async fn query_source(
        &self,
        source: &dyn FactCheckSource,
        claim_text: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<SourceCandidate>, SourceError> {
        let name = source.name();
        let start = Instant::now();

        if self.breaker.is_open(name) {
            METRICS.record_source(name, "circuit_open", 0.0);
            warn!("Circuit breaker is open for source {}", name);
            return Err(SourceError::CircuitOpen(name.to_string()));
        }

        let timeout = self.config.timeout();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SourceError::Cancelled),
            outcome = tokio::time::timeout(timeout, source.search(claim_text)) => {
                outcome.unwrap_or(Err(SourceError::Timeout(timeout)))
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            Ok(candidates) => {
                self.breaker.mark_success(name);
                METRICS.record_source(name, "success", elapsed);
                debug!("Source {} returned {} candidates", name, candidates.len());
            }
            Err(SourceError::Cancelled) => {
                METRICS.record_source(name, "cancelled", elapsed);
                debug!("Source {} query cancelled", name);
            }
            Err(e) => {
                self.breaker.mark_failure(name);
                METRICS.record_source(name, e.kind(), elapsed);
                warn!("Source {} unavailable: {}", name, e);
            }
        }

        result
    }

    /// Candidates negated on only one side are dropped: the rating speaks
    /// about the opposite statement.
    fn score_candidates(
        &self,
        source: &dyn FactCheckSource,
        claim_text: &str,
        claim_terms: &std::collections::BTreeSet<String>,
        candidates: Vec<SourceCandidate>,
    ) -> Vec<FactCheckMatch> {
        candidates
            .into_iter()
            .filter_map(|candidate| {
                let similarity = dice(claim_terms, &content_terms(&candidate.matched_claim_text));
                if similarity < self.config.min_similarity || similarity <= 0.0 {
                    return None;
                }
                if polarity_differs(claim_text, &candidate.matched_claim_text) {
                    debug!(
                        "Dropping candidate with opposite polarity from {}: {}",
                        source.name(),
                        candidate.matched_claim_text
                    );
                    return None;
                }

                let credibility = candidate
                    .source_credibility
                    .filter(|c| c.is_finite())
                    .unwrap_or_else(|| source.credibility())
                    .clamp(0.0, 1.0);

                Some(FactCheckMatch {
                    source_name: source.name().to_string(),
                    source_credibility: credibility,
                    matched_claim_text: candidate.matched_claim_text,
                    verdict: candidate.verdict,
                    similarity: similarity.clamp(0.0, 1.0),
                    url: candidate.url,
                    publisher: candidate.publisher,
                    rating_text: candidate.rating_text,
                })
            })
            .collect()
    }
}

/// Sort best first, drop repeated URLs and truncate
fn rank_matches(mut matches: Vec<FactCheckMatch>, max_matches: usize) -> Vec<FactCheckMatch> {
    matches.sort_by(|a, b| {
        b.evidence_weight()
            .total_cmp(&a.evidence_weight())
            .then(b.similarity.total_cmp(&a.similarity))
            .then_with(|| a.source_name.cmp(&b.source_name))
    });

    let mut seen = HashSet::new();
    matches.retain(|m| seen.insert(m.url.clone()));
    matches.truncate(max_matches);
    matches
}
