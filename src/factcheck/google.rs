//! Google Fact Check Tools `claims:search` client

use super::http_source::status_error;
use super::models::{SourceCandidate, SourceError};
use super::rating::normalize_rating;
use super::retry::RetryPolicy;
use super::source::FactCheckSource;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_GOOGLE_ENDPOINT: &str =
    "https://factchecktools.googleapis.com/v1alpha1/claims:search";

/// Credibility of well-known fact-checking publishers
const PUBLISHER_CREDIBILITY: &[(&str, f64)] = &[
    ("reuters", 0.95),
    ("associated press", 0.95),
    ("apnews", 0.95),
    ("ap fact check", 0.95),
    ("snopes", 0.9),
    ("politifact", 0.9),
    ("factcheck.org", 0.9),
    ("full fact", 0.9),
    ("fullfact", 0.9),
    ("afp", 0.9),
    ("usa today", 0.8),
];

/// Look up a publisher by name or site; unknown publishers get the source default
pub fn publisher_credibility(name: Option<&str>, site: Option<&str>) -> Option<f64> {
    let haystack = format!(
        "{} {}",
        name.unwrap_or_default().to_lowercase(),
        site.unwrap_or_default().to_lowercase()
    );
    PUBLISHER_CREDIBILITY
        .iter()
        .find(|(needle, _)| haystack.contains(needle))
        .map(|(_, credibility)| *credibility)
}

pub struct GoogleFactCheckSource {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    language_code: String,
    page_size: u32,
    credibility: f64,
    retry: RetryPolicy,
}

impl GoogleFactCheckSource {
    pub fn new(
        api_key: SecretString,
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
            endpoint: DEFAULT_GOOGLE_ENDPOINT.to_string(),
            api_key,
            language_code: "en".to_string(),
            page_size: 10,
            credibility,
            retry,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_language(mut self, language_code: impl Into<String>, page_size: u32) -> Self {
        self.language_code = language_code.into();
        self.page_size = page_size;
        self
    }

    async fn call_search(&self, claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        debug!("Querying Google Fact Check Tools");

        let page_size = self.page_size.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("query", claim_text),
                ("key", self.api_key.expose_secret().as_str()),
                ("languageCode", self.language_code.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        let body: ClaimSearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(body.into_candidates())
    }
}

#[async_trait]
impl FactCheckSource for GoogleFactCheckSource {
    fn name(&self) -> &str {
        "google_fact_check"
    }

    fn credibility(&self) -> f64 {
        self.credibility
    }

    async fn search(&self, claim_text: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        self.retry
            .run("google_fact_check", || self.call_search(claim_text))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct ClaimSearchResponse {
    #[serde(default)]
    claims: Vec<GoogleClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleClaim {
    #[serde(default)]
    text: String,
    #[serde(default)]
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimReview {
    #[serde(default)]
    publisher: Option<Publisher>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    textual_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    site: Option<String>,
}

impl ClaimSearchResponse {
    /// One candidate per review; reviews without a URL are dropped
    fn into_candidates(self) -> Vec<SourceCandidate> {
        let mut candidates = Vec::new();
        for claim in self.claims {
            if claim.text.trim().is_empty() {
                continue;
            }
            for review in claim.claim_review {
                let Some(url) = review.url else { continue };
                let rating = review.textual_rating.unwrap_or_default();
                let (name, site) = match &review.publisher {
                    Some(p) => (p.name.clone(), p.site.clone()),
                    None => (None, None),
                };

                candidates.push(SourceCandidate {
                    matched_claim_text: claim.text.clone(),
                    verdict: normalize_rating(&rating),
                    url,
                    source_credibility: publisher_credibility(name.as_deref(), site.as_deref()),
                    publisher: name.or(site),
                    rating_text: Some(rating).filter(|r| !r.is_empty()),
                });
            }
        }
        candidates
    }
}
