//! Confidence scoring: fusion of pattern signals and fact-check matches

pub mod scorer;

pub use scorer::{ConfidenceScorer, ScoreBreakdown, ScoringConfig};
