//! Generic JSON fact-check source over HTTP
//!
//! Issues `GET {endpoint}?query=<claim>` and accepts either a bare array of
//! candidates or an object with a `results` array.

use super::models::{SourceCandidate, SourceError};
use super::rating::normalize_rating;
use super::retry::RetryPolicy;
use super::source::FactCheckSource;
use crate::claims::FactCheckVerdict;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// JSON search endpoint speaking the candidate format
pub struct HttpFactCheckSource {
    http: Client,
    name: String,
    endpoint: String,
    credibility: f64,
    api_key: Option<SecretString>,
    retry: RetryPolicy,
}

impl HttpFactCheckSource {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        credibility: f64,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            name: name.into(),
            endpoint: endpoint.into(),
            credibility,
            api_key: None,
            retry,
        })
    }

    /// Send the key as a bearer token
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    async fn call_search(&self, claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        debug!("Querying {} at {}", self.name, self.endpoint);

        let mut req = self.http.get(&self.endpoint).query(&[("query", claim_text)]);
        if let Some(api_key) = &self.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(body.into_candidates())
    }
}

#[async_trait]
impl FactCheckSource for HttpFactCheckSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn credibility(&self) -> f64 {
        self.credibility
    }

    async fn search(&self, claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        self.retry
            .run(&self.name, || self.call_search(claim_text))
            .await
    }
}

/// Map a non-success status: throttling and server errors are retryable
pub(crate) fn status_error(status: StatusCode, body: &str) -> SourceError {
    let message = format!("Status {}: {}", status, body.chars().take(200).collect::<String>());
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        SourceError::UpstreamError(message)
    } else {
        SourceError::Rejected(message)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    List(Vec<RawCandidate>),
    Wrapped { results: Vec<RawCandidate> },
}

impl SearchResponse {
    fn into_candidates(self) -> Vec<SourceCandidate> {
        let raw = match self {
            SearchResponse::List(items) => items,
            SearchResponse::Wrapped { results } => results,
        };
        raw.into_iter().map(RawCandidate::into_candidate).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(alias = "claim", alias = "claim_text", alias = "text")]
    matched_claim_text: String,
    #[serde(default, alias = "rating", alias = "textual_rating")]
    verdict: Option<String>,
    url: String,
    #[serde(default, alias = "credibility")]
    source_credibility: Option<f64>,
    #[serde(default)]
    publisher: Option<String>,
}

impl RawCandidate {
    fn into_candidate(self) -> SourceCandidate {
        let verdict = self
            .verdict
            .as_deref()
            .map(normalize_rating)
            .unwrap_or(FactCheckVerdict::Unverified);

        SourceCandidate {
            matched_claim_text: self.matched_claim_text,
            verdict,
            url: self.url,
            source_credibility: self.source_credibility,
            publisher: self.publisher,
            rating_text: self.verdict,
        }
    }
}
