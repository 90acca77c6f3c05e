//! Integration tests for the verification engine
//!
//! These tests drive the public engine API end to end with stub fact-check
//! sources and mock HTTP servers, covering scoring, soft failures,
//! cancellation and URL input.

use async_trait::async_trait;
use claim_verifier::{
    claims::ClaimNormalizer,
    config::Config,
    extract::{ContentExtractor, ExtractorConfig, HttpContentExtractor},
    factcheck::{
        CuratedCatalogSource, FactCheckSource, HttpFactCheckSource, RetryPolicy,
        SourceCandidate, SourceError,
    },
    topics::TopicClassifier,
    ExtractionError, FactCheckVerdict, TopicCategory, VerdictLabel, VerificationEngine,
    VerifyError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Source returning a fixed response after an optional delay
struct StubSource {
    name: &'static str,
    credibility: f64,
    delay: Duration,
    response: Result<Vec<SourceCandidate>, SourceError>,
}

impl StubSource {
    fn with(name: &'static str, credibility: f64, candidates: Vec<SourceCandidate>) -> Arc<Self> {
        Arc::new(Self {
            name,
            credibility,
            delay: Duration::ZERO,
            response: Ok(candidates),
        })
    }

    fn empty(name: &'static str) -> Arc<Self> {
        Self::with(name, 0.9, vec![])
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            credibility: 0.9,
            delay: Duration::ZERO,
            response: Err(SourceError::RequestFailed("connection refused".into())),
        })
    }

    fn hanging(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            credibility: 0.9,
            delay: Duration::from_secs(30),
            response: Ok(vec![]),
        })
    }
}

#[async_trait]
impl FactCheckSource for StubSource {
    fn name(&self) -> &str {
        self.name
    }

    fn credibility(&self) -> f64 {
        self.credibility
    }

    async fn search(&self, _claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

/// Extractor that must not be reached
struct NoExtractor;

#[async_trait]
impl ContentExtractor for NoExtractor {
    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        Err(ExtractionError::InvalidUrl(url.to_string()))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.retrieval.timeout_ms = 200;
    config
}

fn engine_with(sources: Vec<Arc<dyn FactCheckSource>>) -> VerificationEngine {
    VerificationEngine::new(&test_config(), sources, Arc::new(NoExtractor)).unwrap()
}

const NEUTRAL: &str = "The city council meets on Tuesday evenings";

#[tokio::test]
async fn test_confidence_bounds_and_label_for_varied_inputs() {
    let engine = engine_with(vec![StubSource::empty("stub")]);

    for input in [
        "Drinking bleach cures COVID-19",
        "WAKE UP!!! They don't want you to know the SHOCKING TRUTH about 5G",
        "According to the WHO, peer-reviewed studies show vaccines are safe",
        NEUTRAL,
        "Unemployment fell to 3.9 percent last quarter, the Labor Department said",
    ] {
        let result = engine.verify(input).await.unwrap();
        assert!(
            (-1.0..=1.0).contains(&result.confidence),
            "{}: {}",
            input,
            result.confidence
        );
        assert!(!result.verdict_label.as_str().is_empty());
        assert!(!result.rationale.is_empty());
    }
}

#[tokio::test]
async fn test_neutral_claim_without_evidence_is_uncertain_zero() {
    let engine = engine_with(vec![StubSource::empty("stub")]);

    let result = engine.verify(NEUTRAL).await.unwrap();

    assert!(result.signals.is_empty());
    assert!(result.matches.is_empty());
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.verdict_label, VerdictLabel::Uncertain);
    assert!(result.evidence_insufficient);
}

#[tokio::test]
async fn test_false_match_lowers_neutral_claim() {
    let source = StubSource::with(
        "stub",
        1.0,
        vec![SourceCandidate::new(NEUTRAL, FactCheckVerdict::False, "https://example.org/council")
            .with_credibility(1.0)],
    );
    let engine = engine_with(vec![source]);

    let result = engine.verify(NEUTRAL).await.unwrap();

    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].similarity, 1.0);
    assert!(result.confidence < 0.0);
}

#[tokio::test]
async fn test_bleach_claim_with_false_fact_check() {
    let source = StubSource::with(
        "fda",
        0.95,
        vec![SourceCandidate::new(
            "Drinking bleach can cure COVID-19 and other illnesses",
            FactCheckVerdict::False,
            "https://example.org/bleach",
        )],
    );
    let engine = engine_with(vec![source]);

    let result = engine.verify("Drinking bleach cures COVID-19").await.unwrap();

    assert_eq!(result.topic, TopicCategory::Health);
    let signal = result
        .signals
        .iter()
        .find(|s| s.name == "dangerous_health_claim")
        .expect("dangerous_health_claim signal");
    assert_eq!(signal.weight, -0.8);
    assert!(result.confidence < -0.5, "confidence {}", result.confidence);
    assert_eq!(result.verdict_label, VerdictLabel::LikelyFalse);
    assert!(result.rationale.contains("dangerous_health_claim"));
}

#[tokio::test]
async fn test_negated_claims_do_not_inherit_false_ratings() {
    let engine = engine_with(vec![Arc::new(CuratedCatalogSource::default())]);

    for input in [
        "The Earth is not flat",
        "Drinking bleach does not cure COVID-19",
        "Vaccines do not contain microchips for tracking people",
    ] {
        let result = engine.verify(input).await.unwrap();
        assert_ne!(
            result.verdict_label,
            VerdictLabel::LikelyFalse,
            "{}: {}",
            input,
            result.rationale
        );
        assert!(result.matches.iter().all(|m| m.verdict != FactCheckVerdict::False));
        assert!(result.signals.iter().all(|s| s.name != "dangerous_health_claim"));
    }

    // The affirmative form still picks up the catalog rating
    let result = engine.verify("The Earth is flat").await.unwrap();
    assert_eq!(result.verdict_label, VerdictLabel::LikelyFalse);
}

#[tokio::test]
async fn test_all_sources_failing_or_timing_out() {
    let engine = engine_with(vec![StubSource::failing("down"), StubSource::hanging("slow")]);

    let result = engine.verify("Drinking bleach cures COVID-19").await.unwrap();

    assert!(result.evidence_insufficient);
    assert_eq!(result.factcheck_contribution, 0.0);
    assert_eq!(result.unavailable_sources.len(), 2);
    // Pattern evidence alone decides
    assert!((result.confidence - result.pattern_contribution).abs() < 1e-9);
    assert!(result.rationale.contains("Unavailable sources"));
}

#[tokio::test]
async fn test_partial_failure_keeps_evidence() {
    let good = StubSource::with(
        "good",
        0.9,
        vec![SourceCandidate::new(
            "The Earth is flat",
            FactCheckVerdict::False,
            "https://example.org/flat",
        )],
    );
    let engine = engine_with(vec![good, StubSource::failing("down")]);

    let result = engine.verify("The Earth is flat").await.unwrap();

    assert!(!result.evidence_insufficient);
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.unavailable_sources.len(), 1);
    assert_eq!(result.unavailable_sources[0].source_name, "down");
}

#[tokio::test]
async fn test_no_sources_configured() {
    let engine = engine_with(vec![]);
    let result = engine.verify("The Earth is flat").await.unwrap();

    assert!(result.evidence_insufficient);
    assert!(result.unavailable_sources.is_empty());
}

#[tokio::test]
async fn test_cancellation_returns_promptly() {
    let mut config = test_config();
    config.retrieval.timeout_ms = 30_000;
    let engine = VerificationEngine::new(
        &config,
        vec![StubSource::hanging("slow")],
        Arc::new(NoExtractor),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.verify_with_cancel("The Earth is flat", &cancel),
    )
    .await
    .expect("verification should stop once cancelled")
    .unwrap();

    assert!(result.evidence_insufficient);
    assert_eq!(result.unavailable_sources[0].reason, "query cancelled");
}

#[tokio::test]
async fn test_invalid_inputs() {
    let engine = engine_with(vec![StubSource::empty("stub")]);

    for input in ["", "   \t\n", "Hi.", "Yes! No?"] {
        let err = engine.verify(input).await.unwrap_err();
        assert!(matches!(err, VerifyError::InvalidClaim(_)), "{:?}", input);
    }
}

#[tokio::test]
async fn test_verify_all_returns_one_result_per_claim() {
    let engine = engine_with(vec![StubSource::empty("stub")]);

    let results = engine
        .verify_all("The Earth is flat. Drinking bleach cures COVID-19. The Earth is flat!")
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].claim_text, "The Earth is flat.");
    assert_eq!(results[1].topic, TopicCategory::Health);
    assert_ne!(results[0].claim_id, results[1].claim_id);
}

#[tokio::test]
async fn test_http_source_and_extractor_over_mock_servers() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/article")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(
            "<html><body><nav><p>Menu</p></nav>\
             <p>Vaccines contain microchips for tracking people.</p></body></html>",
        )
        .create_async()
        .await;
    server
        .mock("GET", "/search")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"results": [{
                "claim": "Vaccines contain microchips to track people",
                "rating": "Pants on Fire",
                "url": "https://example.org/microchips",
                "publisher": "Example Checks"
            }]}"#,
        )
        .create_async()
        .await;

    let source = HttpFactCheckSource::new(
        "mock_checks",
        format!("{}/search", server.url()),
        0.9,
        Duration::from_secs(2),
        RetryPolicy::new(0, Duration::from_millis(1)),
    )
    .unwrap();
    let extractor = HttpContentExtractor::new(ExtractorConfig::default()).unwrap();

    let engine =
        VerificationEngine::new(&test_config(), vec![Arc::new(source)], Arc::new(extractor))
            .unwrap();

    let result = engine
        .verify(&format!("{}/article", server.url()))
        .await
        .unwrap();

    assert_eq!(result.claim_text, "Vaccines contain microchips for tracking people.");
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].verdict, FactCheckVerdict::False);
    assert_eq!(result.matches[0].publisher.as_deref(), Some("Example Checks"));
    assert!(result.confidence < 0.0);
}

#[tokio::test]
async fn test_extraction_failure_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server.mock("GET", "/gone").with_status(410).create_async().await;

    let engine = VerificationEngine::new(
        &test_config(),
        vec![],
        Arc::new(HttpContentExtractor::new(ExtractorConfig::default()).unwrap()),
    )
    .unwrap();

    let err = engine
        .verify(&format!("{}/gone", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::Extraction(ExtractionError::Status(410))));
}

#[test]
fn test_normalization_is_idempotent() {
    let normalizer = ClaimNormalizer::default();
    let raw = "  Dr. Smith said the   vaccine is safe.\tIt was tested on 40,000 people!  ";

    let once = normalizer.normalize(raw).unwrap();
    let twice = normalizer.normalize(&once.join(" ")).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_topic_classification_is_deterministic() {
    let classifier = TopicClassifier::default();
    let text = "The senate passed a bill on vaccine funding for hospitals";

    let first = classifier.classify(text);
    for _ in 0..10 {
        assert_eq!(classifier.classify(text), first);
    }
}

#[test]
fn test_verify_from_blocking_context() {
    let engine = engine_with(vec![StubSource::empty("stub")]);
    let result = tokio_test::block_on(engine.verify(NEUTRAL)).unwrap();
    assert_eq!(result.verdict_label, VerdictLabel::Uncertain);
}
