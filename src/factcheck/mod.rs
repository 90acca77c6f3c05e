//! Fact-check evidence retrieval
//!
//! Sources implement `FactCheckSource`; the retriever queries them all
//! concurrently, each behind a timeout and a per-source circuit breaker,
//! then scores, ranks and caches the merged matches.

pub mod circuit_breaker;
pub mod config;
pub mod curated;
pub mod google;
pub mod http_source;
pub mod models;
pub mod rating;
pub mod retriever;
pub mod retry;
pub mod source;

pub use circuit_breaker::{BreakerState, BreakerStats, CircuitBreaker, CircuitBreakerConfig};
pub use config::{build_sources, default_sources, SourceConfig};
pub use curated::{CuratedCatalogSource, CuratedEntry};
pub use google::GoogleFactCheckSource;
pub use http_source::HttpFactCheckSource;
pub use models::{SourceCandidate, SourceError};
pub use rating::normalize_rating;
pub use retriever::{FactCheckRetriever, RetrievalConfig, RetrievalError, RetrievalOutcome};
pub use retry::RetryPolicy;
pub use source::FactCheckSource;
