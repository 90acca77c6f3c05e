//! Linguistic misinformation pattern detection
//!
//! Rules are a data-driven registry of independent predicates:
//! - keyword and phrase sets
//! - regular expressions
//! - text heuristics (capitalization, superlative density, punctuation)
//!
//! Every firing rule contributes one `PatternSignal` with its fixed weight.

pub mod detector;
pub mod rules;

pub use detector::{PatternConfig, PatternDetector};
pub use rules::{default_rules, MatcherDef, PatternRuleDef};
