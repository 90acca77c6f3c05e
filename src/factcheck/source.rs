//! Fact-check source abstraction

use super::models::{SourceCandidate, SourceError};
use async_trait::async_trait;

/// An external fact-check source
///
/// Implementations perform a single search; timeouts, retries across the
/// whole query and circuit breaking are applied by the retriever.
#[async_trait]
pub trait FactCheckSource: Send + Sync {
    /// Source name (must be unique among configured sources)
    fn name(&self) -> &str;

    /// Default credibility in [0, 1] for candidates that carry none
    fn credibility(&self) -> f64;

    /// Search for fact-checks related to the claim text
    async fn search(&self, claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError>;
}
