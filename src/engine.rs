//! Verification engine: the public entry point wiring every pipeline stage

use crate::claims::{Claim, ClaimNormalizer, VerificationResult};
use crate::config::Config;
use crate::error::{Result, VerifyError};
use crate::extract::{ContentExtractor, HttpContentExtractor};
use crate::factcheck::{build_sources, FactCheckRetriever, FactCheckSource, RetrievalError};
use crate::metrics::METRICS;
use crate::patterns::PatternDetector;
use crate::report::ResultAggregator;
use crate::scoring::ConfidenceScorer;
use crate::topics::TopicClassifier;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Normalize, classify, detect, retrieve, score and report
pub struct VerificationEngine {
    normalizer: ClaimNormalizer,
    classifier: TopicClassifier,
    detector: PatternDetector,
    retriever: FactCheckRetriever,
    scorer: ConfidenceScorer,
    aggregator: ResultAggregator,
    extractor: Arc<dyn ContentExtractor>,
}

impl VerificationEngine {
    /// Build every component from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = build_sources(&config.sources, &config.retrieval)?;
        let extractor = HttpContentExtractor::new(config.extractor.clone())
            .map_err(|e| VerifyError::Config(e.to_string()))?;

        Self::new(config, sources, Arc::new(extractor))
    }

    /// Build with explicit sources and extractor
    pub fn new(
        config: &Config,
        sources: Vec<Arc<dyn FactCheckSource>>,
        extractor: Arc<dyn ContentExtractor>,
    ) -> Result<Self> {
        config.validate()?;

        let engine = Self {
            normalizer: ClaimNormalizer::new(config.normalizer.clone()),
            classifier: TopicClassifier::new(&config.topics),
            detector: PatternDetector::new(&config.patterns)?,
            retriever: FactCheckRetriever::new(sources, config.retrieval.clone()),
            scorer: ConfidenceScorer::new(config.scoring.clone()),
            aggregator: ResultAggregator::new(),
            extractor,
        };

        info!(
            "Verification engine ready: {} pattern rules, sources: {:?}",
            engine.detector.rule_names().len(),
            engine.retriever.source_names()
        );
        Ok(engine)
    }

    /// Names of the configured fact-check sources
    pub fn source_names(&self) -> Vec<&str> {
        self.retriever.source_names()
    }

    /// Verify the lead claim of a text or article URL
    pub async fn verify(&self, input: &str) -> Result<VerificationResult> {
        self.verify_with_cancel(input, &CancellationToken::new()).await
    }

    /// Like `verify`, aborting outstanding source queries when `cancel` fires
    pub async fn verify_with_cancel(
        &self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<VerificationResult> {
        let claims = self.resolve_input(input).await?;
        let lead = claims
            .first()
            .ok_or_else(|| VerifyError::Internal("normalizer returned no claims".into()))?;

        self.verify_claim(lead, cancel).await
    }

    /// Verify every atomic claim in the input, in input order
    pub async fn verify_all(&self, input: &str) -> Result<Vec<VerificationResult>> {
        let cancel = CancellationToken::new();
        let claims = self.resolve_input(input).await?;

        join_all(claims.iter().map(|claim| self.verify_claim(claim, &cancel)))
            .await
            .into_iter()
            .collect()
    }

    /// Turn raw input into claims, extracting article text for URLs
    async fn resolve_input(&self, input: &str) -> Result<Vec<Claim>> {
        let trimmed = input.trim();

        let result = if is_url(trimmed) {
            info!("Extracting article from {}", trimmed);
            match self.extractor.extract(trimmed).await {
                Ok(text) => self.normalizer.build_claims(&text, Some(trimmed)),
                Err(e) => {
                    METRICS.extraction_failures.inc();
                    warn!("Extraction failed for {}: {}", trimmed, e);
                    return Err(e.into());
                }
            }
        } else {
            self.normalizer.build_claims(input, None)
        };

        if let Err(VerifyError::InvalidClaim(reason)) = &result {
            METRICS.invalid_claims.inc();
            debug!("Rejected input: {}", reason);
        }
        result
    }

    async fn verify_claim(
        &self,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> Result<VerificationResult> {
        let start = Instant::now();
        let text = claim.normalized_text.as_str();
        debug!("Verifying claim {}: {}", claim.id, text);

        let topic = self.classifier.classify(text);
        let signals = self.detector.detect(text, Some(topic));

        let (matches, failures) = match self.retriever.retrieve(text, cancel).await {
            Ok(outcome) => (outcome.matches, outcome.failures),
            Err(RetrievalError::AllSourcesUnavailable { failures }) => {
                warn!("No fact-check evidence for claim {}: all sources unavailable", claim.id);
                (Vec::new(), failures)
            }
        };

        let score = self.scorer.score(&signals, &matches, topic);
        let result = self
            .aggregator
            .assemble(claim, topic, signals, matches, score, failures)?;

        METRICS.record_verification(
            result.verdict_label.as_str(),
            result.evidence_insufficient,
            start.elapsed().as_secs_f64(),
        );
        info!(
            "Claim {} verified: topic={}, verdict={}, confidence={:.2}",
            claim.id, result.topic, result.verdict_label, result.confidence
        );

        Ok(result)
    }
}

/// A single http(s) token is treated as an article URL
pub fn is_url(input: &str) -> bool {
    let input = input.trim();
    !input.is_empty()
        && !input.contains(char::is_whitespace)
        && (input.starts_with("http://") || input.starts_with("https://"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{FactCheckVerdict, TopicCategory, VerdictLabel};
    use crate::error::ExtractionError;
    use crate::factcheck::{SourceCandidate, SourceError};
    use async_trait::async_trait;

    struct FixedSource(std::result::Result<Vec<SourceCandidate>, SourceError>);

    #[async_trait]
    impl FactCheckSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn credibility(&self) -> f64 {
            0.95
        }

        async fn search(&self, _: &str) -> std::result::Result<Vec<SourceCandidate>, SourceError> {
            self.0.clone()
        }
    }

    struct StaticExtractor(&'static str);

    #[async_trait]
    impl ContentExtractor for StaticExtractor {
        async fn extract(&self, url: &str) -> std::result::Result<String, ExtractionError> {
            if self.0.is_empty() {
                Err(ExtractionError::Status(404))
            } else {
                debug!("static extraction for {}", url);
                Ok(self.0.to_string())
            }
        }
    }

    fn engine(source: FixedSource, article: &'static str) -> VerificationEngine {
        VerificationEngine::new(
            &Config::default(),
            vec![Arc::new(source)],
            Arc::new(StaticExtractor(article)),
        )
        .unwrap()
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.org/a"));
        assert!(is_url("  http://example.org  "));
        assert!(!is_url("see https://example.org/a"));
        assert!(!is_url("ftp://example.org"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn test_bleach_claim_is_likely_false() {
        let engine = engine(
            FixedSource(Ok(vec![SourceCandidate::new(
                "Drinking bleach cures COVID-19",
                FactCheckVerdict::False,
                "https://example.org/bleach",
            )])),
            "",
        );

        let result = engine.verify("Drinking bleach cures COVID-19").await.unwrap();

        assert_eq!(result.topic, TopicCategory::Health);
        assert!(result.signals.iter().any(|s| s.name == "dangerous_health_claim"));
        assert!(result.confidence < -0.5);
        assert_eq!(result.verdict_label, VerdictLabel::LikelyFalse);
        assert!(!result.evidence_insufficient);
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_returns_result() {
        let engine = engine(FixedSource(Err(SourceError::UpstreamError("503".into()))), "");

        let result = engine
            .verify("The city council meets on Tuesday evenings")
            .await
            .unwrap();

        assert!(result.evidence_insufficient);
        assert_eq!(result.factcheck_contribution, 0.0);
        assert_eq!(result.unavailable_sources.len(), 1);
        assert!(result.rationale.contains("Insufficient evidence"));
    }

    #[tokio::test]
    async fn test_invalid_claim() {
        let engine = engine(FixedSource(Ok(vec![])), "");
        let err = engine.verify("   ").await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidClaim(_)));
    }

    #[tokio::test]
    async fn test_url_input_uses_extractor() {
        let engine = engine(
            FixedSource(Ok(vec![])),
            "Vaccines contain microchips for tracking people. Share this now.",
        );

        let results = engine.verify_all("https://example.org/article").await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].claim_text.starts_with("Vaccines contain microchips"));
    }

    #[tokio::test]
    async fn test_extraction_failure_surfaces() {
        let engine = engine(FixedSource(Ok(vec![])), "");
        let err = engine.verify("https://example.org/missing").await.unwrap_err();
        assert_eq!(err.code(), "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_cancelled_verification_is_soft() {
        let engine = engine(FixedSource(Ok(vec![])), "");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine
            .verify_with_cancel("The earth is flat and NASA lies about it", &cancel)
            .await
            .unwrap();
        assert!(result.evidence_insufficient);
    }
}
