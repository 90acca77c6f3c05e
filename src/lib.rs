//! Claim verification engine
//!
//! Normalizes a claim (or an article behind a URL), classifies its topic,
//! detects misinformation patterns, retrieves fact-checks from external
//! sources and fuses the evidence into a signed confidence with a rationale.

pub mod api;
pub mod claims;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod factcheck;
pub mod metrics;
pub mod patterns;
pub mod report;
pub mod scoring;
pub mod text;
pub mod topics;

pub use claims::{
    Claim, FactCheckMatch, FactCheckVerdict, PatternSignal, SourceFailure, TopicCategory,
    VerdictLabel, VerificationResult,
};
pub use config::Config;
pub use engine::VerificationEngine;
pub use error::{ExtractionError, Result, VerifyError};
