//! Verification report assembly

pub mod aggregator;

pub use aggregator::{build_rationale, ResultAggregator};
