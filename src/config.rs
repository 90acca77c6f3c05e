//! Service configuration
//!
//! Loaded from an optional TOML file, then overridden by `VERIFIER__*`
//! environment variables (`VERIFIER__SERVER__PORT=9000`,
//! `VERIFIER__RETRIEVAL__TIMEOUT_MS=3000`). Every field has a default.

use crate::claims::NormalizerConfig;
use crate::error::{Result, VerifyError};
use crate::extract::ExtractorConfig;
use crate::factcheck::{default_sources, RetrievalConfig, SourceConfig};
use crate::factcheck::config::validate_sources;
use crate::patterns::PatternConfig;
use crate::scoring::ScoringConfig;
use crate::topics::TopicConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "VERIFIER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default)]
    pub topics: TopicConfig,

    #[serde(default)]
    pub patterns: PatternConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,

    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            normalizer: NormalizerConfig::default(),
            topics: TopicConfig::default(),
            patterns: PatternConfig::default(),
            retrieval: RetrievalConfig::default(),
            scoring: ScoringConfig::default(),
            extractor: ExtractorConfig::default(),
            sources: default_sources(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body limit in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    256 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration; `RUST_LOG` takes precedence over `level`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from a TOML file plus environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load from environment overrides only
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field constraints of every section
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(VerifyError::Config("server.port must be > 0".into()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(VerifyError::Config("server.max_body_bytes must be > 0".into()));
        }
        if self.extractor.timeout_ms == 0 || self.extractor.max_bytes == 0 {
            return Err(VerifyError::Config("extractor limits must be > 0".into()));
        }

        self.normalizer.validate()?;
        self.topics.validate()?;
        self.patterns.validate()?;
        self.retrieval.validate()?;
        self.scoring.validate()?;
        validate_sources(&self.sources)?;
        Ok(())
    }
}
