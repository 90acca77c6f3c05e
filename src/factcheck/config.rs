//! Source configuration and construction

use super::curated::{default_catalog, CuratedCatalogSource, CuratedEntry};
use super::google::{GoogleFactCheckSource, DEFAULT_GOOGLE_ENDPOINT};
use super::http_source::HttpFactCheckSource;
use super::retriever::RetrievalConfig;
use super::source::FactCheckSource;
use crate::error::{Result, VerifyError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One configured fact-check source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Google Fact Check Tools; skipped when the key variable is unset
    Google {
        #[serde(default = "default_google_key_env")]
        api_key_env: String,
        #[serde(default = "default_google_endpoint")]
        endpoint: String,
        #[serde(default = "default_google_credibility")]
        credibility: f64,
        #[serde(default = "default_language_code")]
        language_code: String,
        #[serde(default = "default_page_size")]
        page_size: u32,
    },
    /// Generic JSON search endpoint
    Http {
        name: String,
        endpoint: String,
        #[serde(default = "default_http_credibility")]
        credibility: f64,
        #[serde(default)]
        api_key_env: Option<String>,
    },
    /// Built-in catalog; `entries` replaces the default catalog when non-empty
    Curated {
        #[serde(default = "default_curated_name")]
        name: String,
        #[serde(default = "default_curated_credibility")]
        credibility: f64,
        #[serde(default)]
        entries: Vec<CuratedEntry>,
    },
}

fn default_google_key_env() -> String {
    "GOOGLE_FACTCHECK_API_KEY".to_string()
}

fn default_google_endpoint() -> String {
    DEFAULT_GOOGLE_ENDPOINT.to_string()
}

fn default_google_credibility() -> f64 {
    0.85
}

fn default_language_code() -> String {
    "en".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_http_credibility() -> f64 {
    0.7
}

fn default_curated_name() -> String {
    "curated".to_string()
}

fn default_curated_credibility() -> f64 {
    0.9
}

/// Curated catalog plus Google when a key is available
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::Curated {
            name: default_curated_name(),
            credibility: default_curated_credibility(),
            entries: Vec::new(),
        },
        SourceConfig::Google {
            api_key_env: default_google_key_env(),
            endpoint: default_google_endpoint(),
            credibility: default_google_credibility(),
            language_code: default_language_code(),
            page_size: default_page_size(),
        },
    ]
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            SourceConfig::Google { .. } => "google_fact_check",
            SourceConfig::Http { name, .. } | SourceConfig::Curated { name, .. } => name.as_str(),
        }
    }

    fn credibility(&self) -> f64 {
        match self {
            SourceConfig::Google { credibility, .. }
            | SourceConfig::Http { credibility, .. }
            | SourceConfig::Curated { credibility, .. } => *credibility,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let credibility = self.credibility();
        if !(0.0..=1.0).contains(&credibility) {
            return Err(VerifyError::Config(format!(
                "source {}: credibility {} outside [0, 1]",
                self.name(),
                credibility
            )));
        }

        match self {
            SourceConfig::Google { endpoint, page_size, .. } => {
                check_endpoint(self.name(), endpoint)?;
                if *page_size == 0 {
                    return Err(VerifyError::Config("google: page_size must be > 0".into()));
                }
            }
            SourceConfig::Http { name, endpoint, .. } => {
                if name.trim().is_empty() {
                    return Err(VerifyError::Config("http source needs a name".into()));
                }
                check_endpoint(name, endpoint)?;
            }
            SourceConfig::Curated { entries, .. } => {
                if entries.iter().any(|e| !(0.0..=1.0).contains(&e.credibility)) {
                    return Err(VerifyError::Config(format!(
                        "source {}: entry credibility outside [0, 1]",
                        self.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_endpoint(name: &str, endpoint: &str) -> Result<()> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(VerifyError::Config(format!(
            "source {}: endpoint must be an http(s) URL",
            name
        )))
    }
}

/// Validate the source list as a whole
pub fn validate_sources(sources: &[SourceConfig]) -> Result<()> {
    let mut names = HashSet::new();
    for source in sources {
        source.validate()?;
        if !names.insert(source.name()) {
            return Err(VerifyError::Config(format!(
                "duplicate source name: {}",
                source.name()
            )));
        }
    }
    Ok(())
}

fn read_key(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::new)
}

/// Instantiate sources, reading API keys from the environment
pub fn build_sources(
    configs: &[SourceConfig],
    retrieval: &RetrievalConfig,
) -> Result<Vec<Arc<dyn FactCheckSource>>> {
    validate_sources(configs)?;

    let mut sources: Vec<Arc<dyn FactCheckSource>> = Vec::new();
    for config in configs {
        match config {
            SourceConfig::Google {
                api_key_env,
                endpoint,
                credibility,
                language_code,
                page_size,
            } => {
                let Some(api_key) = read_key(api_key_env) else {
                    warn!("{} not set, Google Fact Check source disabled", api_key_env);
                    continue;
                };
                let source = GoogleFactCheckSource::new(
                    api_key,
                    *credibility,
                    retrieval.attempt_timeout(),
                    retrieval.retry_policy(),
                )
                .map_err(|e| VerifyError::Config(e.to_string()))?
                .with_endpoint(endpoint.clone())
                .with_language(language_code.clone(), *page_size);
                sources.push(Arc::new(source));
            }
            SourceConfig::Http {
                name,
                endpoint,
                credibility,
                api_key_env,
            } => {
                let mut source = HttpFactCheckSource::new(
                    name.clone(),
                    endpoint.clone(),
                    *credibility,
                    retrieval.attempt_timeout(),
                    retrieval.retry_policy(),
                )
                .map_err(|e| VerifyError::Config(e.to_string()))?;

                if let Some(var) = api_key_env {
                    match read_key(var) {
                        Some(key) => source = source.with_api_key(key),
                        None => warn!("{} not set, querying {} without a key", var, name),
                    }
                }
                sources.push(Arc::new(source));
            }
            SourceConfig::Curated {
                name,
                credibility,
                entries,
            } => {
                let entries = if entries.is_empty() {
                    default_catalog()
                } else {
                    entries.clone()
                };
                sources.push(Arc::new(CuratedCatalogSource::new(
                    name.clone(),
                    *credibility,
                    entries,
                )));
            }
        }
    }

    info!("Configured {} fact-check sources", sources.len());
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_skipped_without_key() {
        let configs = vec![SourceConfig::Google {
            api_key_env: "CLAIM_VERIFIER_TEST_MISSING_KEY".to_string(),
            endpoint: default_google_endpoint(),
            credibility: 0.85,
            language_code: "en".to_string(),
            page_size: 10,
        }];

        let sources = build_sources(&configs, &RetrievalConfig::default()).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_default_sources_include_curated() {
        let sources = build_sources(&default_sources(), &RetrievalConfig::default()).unwrap();
        assert!(sources.iter().any(|s| s.name() == "curated"));
    }

    #[test]
    fn test_deserialize_tagged_sources() {
        let json = r#"[
            {"kind": "http", "name": "local", "endpoint": "http://localhost:9000/search"},
            {"kind": "curated"}
        ]"#;
        let configs: Vec<SourceConfig> = serde_json::from_str(json).unwrap();

        assert_eq!(configs[0].name(), "local");
        assert_eq!(configs[1].name(), "curated");
        assert!(validate_sources(&configs).is_ok());
    }

    #[test]
    fn test_invalid_sources_rejected() {
        let bad_endpoint = vec![SourceConfig::Http {
            name: "x".to_string(),
            endpoint: "ftp://example.org".to_string(),
            credibility: 0.5,
            api_key_env: None,
        }];
        assert!(validate_sources(&bad_endpoint).is_err());

        let duplicate = vec![
            SourceConfig::Curated {
                name: "c".to_string(),
                credibility: 0.9,
                entries: vec![],
            },
            SourceConfig::Curated {
                name: "c".to_string(),
                credibility: 0.9,
                entries: vec![],
            },
        ];
        assert!(validate_sources(&duplicate).is_err());

        let out_of_range = vec![SourceConfig::Curated {
            name: "c".to_string(),
            credibility: 1.5,
            entries: vec![],
        }];
        assert!(validate_sources(&out_of_range).is_err());
    }
}
