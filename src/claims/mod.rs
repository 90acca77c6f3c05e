//! Claims: the unit of verification and its normalization
//!
//! Raw input (claim text or extracted article text) is cleaned, segmented
//! into sentences and de-duplicated into atomic `Claim` values. The models
//! module also holds the shared result types produced by the pipeline.

pub mod models;
pub mod normalizer;

pub use models::{
    Claim, FactCheckMatch, FactCheckVerdict, PatternSignal, SourceFailure, TopicCategory,
    VerdictLabel, VerificationResult,
};
pub use normalizer::{ClaimNormalizer, NormalizerConfig};
