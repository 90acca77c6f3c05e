//! Error types for the verification engine

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Errors surfaced by the verification engine
///
/// Only `InvalidClaim` and `Extraction` are expected to reach callers during a
/// verification; per-source failures are absorbed into the result.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    #[error("Content extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VerifyError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::InvalidClaim(_) => "INVALID_CLAIM",
            VerifyError::Extraction(_) => "EXTRACTION_FAILED",
            VerifyError::Config(_) => "CONFIG_ERROR",
            VerifyError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for VerifyError {
    fn from(e: config::ConfigError) -> Self {
        VerifyError::Config(e.to_string())
    }
}

impl From<regex::Error> for VerifyError {
    fn from(e: regex::Error) -> Self {
        VerifyError::Config(format!("invalid pattern: {}", e))
    }
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Timeout fetching {0}")]
    Timeout(String),

    #[error("No readable text in {0}")]
    Empty(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(VerifyError::InvalidClaim("x".into()).code(), "INVALID_CLAIM");
        let err: VerifyError = ExtractionError::Status(404).into();
        assert_eq!(err.code(), "EXTRACTION_FAILED");
        assert!(err.to_string().contains("404"));
    }
}
