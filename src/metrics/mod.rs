//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, register_histogram_with_registry, Counter, CounterVec,
    Histogram, HistogramVec, Opts, Registry,
};
use std::sync::Arc;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Verification metrics
    pub verifications: CounterVec,
    pub invalid_claims: Counter,
    pub extraction_failures: Counter,
    pub insufficient_evidence: Counter,
    pub verification_duration: Histogram,

    // Fact-check source metrics
    pub source_requests: CounterVec,
    pub source_duration: HistogramVec,
    pub retrieval_cache_hits: Counter,
    pub retrieval_cache_misses: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let verifications = register_counter_vec_with_registry!(
            Opts::new("verifications_total", "Completed verifications by verdict label"),
            &["verdict"],
            registry
        )?;

        let invalid_claims = register_counter_with_registry!(
            Opts::new("invalid_claims_total", "Rejected claim inputs"),
            registry
        )?;

        let extraction_failures = register_counter_with_registry!(
            Opts::new("extraction_failures_total", "Failed article extractions"),
            registry
        )?;

        let insufficient_evidence = register_counter_with_registry!(
            Opts::new(
                "insufficient_evidence_total",
                "Verifications scored without fact-check evidence"
            ),
            registry
        )?;

        let verification_duration = register_histogram_with_registry!(
            "verification_duration_seconds",
            "End-to-end verification duration in seconds",
            registry
        )?;

        let source_requests = register_counter_vec_with_registry!(
            Opts::new("factcheck_source_requests_total", "Fact-check source queries"),
            &["source", "status"],
            registry
        )?;

        let source_duration = register_histogram_vec_with_registry!(
            "factcheck_source_duration_seconds",
            "Fact-check source query duration in seconds",
            &["source"],
            registry
        )?;

        let retrieval_cache_hits = register_counter_with_registry!(
            Opts::new("retrieval_cache_hits_total", "Retrieval cache hits"),
            registry
        )?;

        let retrieval_cache_misses = register_counter_with_registry!(
            Opts::new("retrieval_cache_misses_total", "Retrieval cache misses"),
            registry
        )?;

        Ok(Self {
            registry,
            verifications,
            invalid_claims,
            extraction_failures,
            insufficient_evidence,
            verification_duration,
            source_requests,
            source_duration,
            retrieval_cache_hits,
            retrieval_cache_misses,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a completed verification
    pub fn record_verification(&self, verdict: &str, insufficient: bool, seconds: f64) {
        self.verifications.with_label_values(&[verdict]).inc();
        if insufficient {
            self.insufficient_evidence.inc();
        }
        self.verification_duration.observe(seconds);
    }

    /// Record a source query; `status` is "success" or an error kind
    pub fn record_source(&self, source: &str, status: &str, seconds: f64) {
        self.source_requests.with_label_values(&[source, status]).inc();
        self.source_duration.with_label_values(&[source]).observe(seconds);
    }

    pub fn record_cache(&self, hit: bool) {
        if hit {
            self.retrieval_cache_hits.inc();
        } else {
            self.retrieval_cache_misses.inc();
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
