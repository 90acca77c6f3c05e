//! Article content extraction for URL inputs

pub mod html;
pub mod http;

use crate::error::ExtractionError;
use async_trait::async_trait;

pub use http::{ExtractorConfig, HttpContentExtractor};

/// Turns a URL into readable article text
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String, ExtractionError>;
}
