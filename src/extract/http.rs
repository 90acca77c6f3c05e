//! reqwest-backed content extractor

use super::html::html_to_text;
use super::ContentExtractor;
use crate::error::ExtractionError;
use crate::text::collapse_whitespace;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Reading stops after this many bytes; the rest of the body is never fetched
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("claim-verifier/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Fetches a page and reduces it to its main text
pub struct HttpContentExtractor {
    http: Client,
    config: ExtractorConfig,
}

impl HttpContentExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractionError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Stream the body, stopping once `max_bytes` have been read
    async fn read_limited(
        &self,
        mut response: reqwest::Response,
        url: &str,
    ) -> Result<Vec<u8>, ExtractionError> {
        let limit = self.config.max_bytes;
        let capacity = response
            .content_length()
            .map_or(limit, |len| (len as usize).min(limit));
        let mut body = Vec::with_capacity(capacity);

        while let Some(chunk) = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                ExtractionError::Timeout(url.to_string())
            } else {
                ExtractionError::RequestFailed(e.to_string())
            }
        })? {
            let room = limit - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!("Stopped reading {} at {} bytes", url, limit);
                trim_partial_char(&mut body);
                return Ok(body);
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

/// Drop a multi-byte UTF-8 sequence cut off at the end of the buffer
fn trim_partial_char(body: &mut Vec<u8>) {
    if let Err(e) = std::str::from_utf8(body) {
        if e.error_len().is_none() {
            body.truncate(e.valid_up_to());
        }
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ExtractionError::InvalidUrl(url.to_string()));
        }

        debug!("Fetching article {}", url);

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ExtractionError::Timeout(url.to_string())
            } else if e.is_builder() {
                ExtractionError::InvalidUrl(url.to_string())
            } else {
                ExtractionError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} returned {}", url, status);
            return Err(ExtractionError::Status(status.as_u16()));
        }

        let is_plain_text = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/plain"))
            .unwrap_or(false);

        if let Some(length) = response.content_length() {
            if length > self.config.max_bytes as u64 {
                debug!(
                    "{} announces {} bytes, reading the first {}",
                    url, length, self.config.max_bytes
                );
            }
        }

        let body = self.read_limited(response, url).await?;
        let raw = String::from_utf8_lossy(&body);

        let text = if is_plain_text {
            collapse_whitespace(&raw)
        } else {
            html_to_text(&raw)
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty(url.to_string()));
        }

        info!("Extracted {} characters from {}", text.len(), url);
        Ok(text)
    }
}
