//! Assembles the final `VerificationResult` and its rationale

use crate::claims::{
    Claim, FactCheckMatch, PatternSignal, SourceFailure, TopicCategory, VerificationResult,
};
use crate::error::{Result, VerifyError};
use crate::scoring::ScoreBreakdown;
use chrono::Utc;
use std::fmt::Write;

/// Matches cited in the rationale
const RATIONALE_MATCHES: usize = 3;

/// Pure assembly of verification results
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Build the result, rejecting out-of-range sub-results
    pub fn assemble(
        &self,
        claim: &Claim,
        topic: TopicCategory,
        signals: Vec<PatternSignal>,
        matches: Vec<FactCheckMatch>,
        score: ScoreBreakdown,
        unavailable_sources: Vec<SourceFailure>,
    ) -> Result<VerificationResult> {
        validate(&signals, &matches, &score)?;

        let rationale = build_rationale(&signals, &matches, &score, &unavailable_sources);

        Ok(VerificationResult {
            claim_id: claim.id.clone(),
            claim_text: claim.normalized_text.clone(),
            topic,
            signals,
            matches,
            confidence: score.confidence,
            verdict_label: score.verdict_label,
            rationale,
            pattern_contribution: score.pattern_contribution,
            factcheck_contribution: score.factcheck_contribution,
            evidence_insufficient: score.evidence_insufficient,
            unavailable_sources,
            verified_at: Utc::now(),
        })
    }
}

fn within(value: f64, low: f64, high: f64) -> bool {
    value.is_finite() && value >= low && value <= high
}

fn validate(signals: &[PatternSignal], matches: &[FactCheckMatch], score: &ScoreBreakdown) -> Result<()> {
    if let Some(signal) = signals.iter().find(|s| !within(s.weight, -1.0, 1.0)) {
        return Err(VerifyError::Internal(format!(
            "signal {} has weight {} outside [-1, 1]",
            signal.name, signal.weight
        )));
    }

    if let Some(m) = matches
        .iter()
        .find(|m| !within(m.similarity, 0.0, 1.0) || !within(m.source_credibility, 0.0, 1.0))
    {
        return Err(VerifyError::Internal(format!(
            "match from {} out of range (similarity {}, credibility {})",
            m.source_name, m.similarity, m.source_credibility
        )));
    }

    for (label, value) in [
        ("confidence", score.confidence),
        ("pattern contribution", score.pattern_contribution),
        ("fact-check contribution", score.factcheck_contribution),
    ] {
        if !within(value, -1.0, 1.0) {
            return Err(VerifyError::Internal(format!(
                "{} {} outside [-1, 1]",
                label, value
            )));
        }
    }
    Ok(())
}

/// Human-readable explanation of a score
pub fn build_rationale(
    signals: &[PatternSignal],
    matches: &[FactCheckMatch],
    score: &ScoreBreakdown,
    unavailable_sources: &[SourceFailure],
) -> String {
    let mut out = format!(
        "Verdict: {} (confidence {:+.2}).",
        score.verdict_label.as_str().replace('_', " "),
        score.confidence
    );

    let (negative, positive): (Vec<_>, Vec<_>) = signals.iter().partition(|s| s.weight < 0.0);
    if signals.is_empty() {
        out.push_str(" No misinformation patterns detected.");
    }
    if !negative.is_empty() {
        let _ = write!(out, " Misinformation patterns detected: {}.", format_signals(&negative));
    }
    if !positive.is_empty() {
        let _ = write!(out, " Factual indicators: {}.", format_signals(&positive));
    }

    if score.evidence_insufficient {
        out.push_str(
            " Insufficient evidence: no usable fact-check matched this claim, \
             so the score rests on linguistic patterns alone.",
        );
    } else {
        let cited: Vec<String> = matches
            .iter()
            .take(RATIONALE_MATCHES)
            .map(|m| {
                let by = m.publisher.as_deref().unwrap_or(&m.source_name);
                format!(
                    "{} rated \"{}\" as {} (similarity {:.2}, credibility {:.2})",
                    by,
                    m.matched_claim_text,
                    m.verdict.as_str(),
                    m.similarity,
                    m.source_credibility
                )
            })
            .collect();
        let _ = write!(
            out,
            " Fact-checks ({} found): {}.",
            matches.len(),
            cited.join("; ")
        );
    }

    if !unavailable_sources.is_empty() {
        let failed: Vec<String> = unavailable_sources
            .iter()
            .map(|f| format!("{} ({})", f.source_name, f.reason))
            .collect();
        let _ = write!(out, " Unavailable sources: {}.", failed.join(", "));
    }

    out
}

fn format_signals(signals: &[&PatternSignal]) -> String {
    signals
        .iter()
        .map(|s| format!("{} ({:+.2})", s.name, s.weight))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{FactCheckVerdict, VerdictLabel};

    fn claim() -> Claim {
        Claim::new(
            "Drinking bleach cures COVID-19".to_string(),
            "Drinking bleach cures COVID-19".to_string(),
            None,
        )
    }

    fn bleach_signal() -> PatternSignal {
        PatternSignal {
            name: "dangerous_health_claim".to_string(),
            weight: -0.8,
            evidence_excerpt: "Drinking bleach".to_string(),
        }
    }

    fn fda_match() -> FactCheckMatch {
        FactCheckMatch {
            source_name: "curated".to_string(),
            source_credibility: 0.95,
            matched_claim_text: "Drinking bleach cures COVID-19".to_string(),
            verdict: FactCheckVerdict::False,
            similarity: 0.9,
            url: "https://www.fda.gov/".to_string(),
            publisher: Some("U.S. Food and Drug Administration".to_string()),
            rating_text: Some("False".to_string()),
        }
    }

    fn breakdown(confidence: f64, insufficient: bool) -> ScoreBreakdown {
        ScoreBreakdown {
            pattern_contribution: -0.8,
            factcheck_contribution: if insufficient { 0.0 } else { -1.0 },
            confidence,
            verdict_label: VerdictLabel::LikelyFalse,
            evidence_insufficient: insufficient,
        }
    }

    #[test]
    fn test_assemble_with_evidence() {
        let result = ResultAggregator::new()
            .assemble(
                &claim(),
                TopicCategory::Health,
                vec![bleach_signal()],
                vec![fda_match()],
                breakdown(-0.92, false),
                vec![],
            )
            .unwrap();

        assert_eq!(result.topic, TopicCategory::Health);
        assert_eq!(result.confidence, -0.92);
        assert!(result.rationale.starts_with("Verdict: likely false (confidence -0.92)."));
        assert!(result.rationale.contains("dangerous_health_claim (-0.80)"));
        assert!(result.rationale.contains("U.S. Food and Drug Administration rated"));
        assert!(!result.rationale.contains("Insufficient evidence"));
    }

    #[test]
    fn test_insufficient_evidence_stated() {
        let failures = vec![SourceFailure {
            source_name: "google_fact_check".to_string(),
            reason: "timed out after 5s".to_string(),
        }];
        let result = ResultAggregator::new()
            .assemble(
                &claim(),
                TopicCategory::Health,
                vec![bleach_signal()],
                vec![],
                breakdown(-0.8, true),
                failures,
            )
            .unwrap();

        assert!(result.evidence_insufficient);
        assert!(result.rationale.contains("Insufficient evidence"));
        assert!(result
            .rationale
            .contains("Unavailable sources: google_fact_check (timed out after 5s)."));
    }

    #[test]
    fn test_rationale_cites_at_most_three_matches() {
        let matches: Vec<_> = (0..5)
            .map(|i| FactCheckMatch {
                url: format!("https://example.org/{}", i),
                publisher: Some(format!("Publisher {}", i)),
                ..fda_match()
            })
            .collect();

        let rationale = build_rationale(&[], &matches, &breakdown(-0.6, false), &[]);

        assert!(rationale.contains("No misinformation patterns detected."));
        assert!(rationale.contains("Fact-checks (5 found)"));
        assert!(rationale.contains("Publisher 2"));
        assert!(!rationale.contains("Publisher 3"));
    }

    #[test]
    fn test_out_of_range_is_internal_error() {
        let mut bad = fda_match();
        bad.similarity = 1.2;

        let err = ResultAggregator::new()
            .assemble(
                &claim(),
                TopicCategory::Health,
                vec![],
                vec![bad],
                breakdown(-0.6, false),
                vec![],
            )
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");

        let err = ResultAggregator::new()
            .assemble(
                &claim(),
                TopicCategory::General,
                vec![],
                vec![],
                breakdown(f64::NAN, true),
                vec![],
            )
            .unwrap_err();
        assert!(matches!(err, VerifyError::Internal(_)));
    }
}
