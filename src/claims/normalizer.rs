//! Claim normalization: cleaning, sentence segmentation and de-duplication

use super::models::Claim;
use crate::error::{Result, VerifyError};
use crate::text;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Abbreviations that end with a period without ending a sentence
const ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "sr", "jr", "st", "vs", "gen", "gov", "sen", "rep", "inc",
    "corp", "approx", "fig",
];

/// Normalizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Minimum number of words for a sentence to count as a claim
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Maximum number of atomic claims kept from one input
    #[serde(default = "default_max_claims")]
    pub max_claims: usize,

    /// Dice similarity at or above which two sentences are duplicates
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,

    /// Input beyond this many characters is ignored
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_min_words() -> usize { 3 }
fn default_max_claims() -> usize { 5 }
fn default_dedup_threshold() -> f64 { 0.9 }
fn default_max_input_chars() -> usize { 100_000 }

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_claims: default_max_claims(),
            dedup_threshold: default_dedup_threshold(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_words == 0 || self.max_claims == 0 || self.max_input_chars == 0 {
            return Err(VerifyError::Config(
                "normalizer limits must be greater than zero".into(),
            ));
        }
        if !(self.dedup_threshold > 0.0 && self.dedup_threshold <= 1.0) {
            return Err(VerifyError::Config(
                "normalizer.dedup_threshold must be within (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Turns raw input into atomic, normalized claim statements
#[derive(Debug, Clone)]
pub struct ClaimNormalizer {
    config: NormalizerConfig,
}

impl ClaimNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize raw text into one or more claim strings
    ///
    /// Fails with `InvalidClaim` when nothing of minimum length remains.
    pub fn normalize(&self, raw: &str) -> Result<Vec<String>> {
        let bounded: String = raw.chars().take(self.config.max_input_chars).collect();
        let cleaned = text::collapse_whitespace(&bounded);

        if cleaned.is_empty() {
            return Err(VerifyError::InvalidClaim("claim text is empty".to_string()));
        }

        let mut claims: Vec<String> = Vec::new();
        let mut kept_terms = Vec::new();

        for sentence in split_sentences(&cleaned) {
            if word_count(&sentence) < self.config.min_words {
                continue;
            }

            let terms = text::content_terms(&sentence);
            let key = text::match_key(&sentence);
            let duplicate = claims
                .iter()
                .zip(kept_terms.iter())
                .any(|(kept, kept_set)| {
                    text::match_key(kept) == key
                        || text::dice(kept_set, &terms) >= self.config.dedup_threshold
                });
            if duplicate {
                debug!("Dropping near-duplicate sentence");
                continue;
            }

            claims.push(sentence);
            kept_terms.push(terms);

            if claims.len() >= self.config.max_claims {
                break;
            }
        }

        if claims.is_empty() {
            return Err(VerifyError::InvalidClaim(format!(
                "claim must contain at least {} words",
                self.config.min_words
            )));
        }

        Ok(claims)
    }

    /// Normalize and wrap each statement in a `Claim`
    pub fn build_claims(&self, raw: &str, source_url: Option<&str>) -> Result<Vec<Claim>> {
        let normalized = self.normalize(raw)?;
        let raw_text = raw.to_string();

        Ok(normalized
            .into_iter()
            .map(|text| Claim::new(raw_text.clone(), text, source_url.map(str::to_string)))
            .collect())
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }
}

impl Default for ClaimNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

/// Words that carry at least one letter or digit
fn word_count(sentence: &str) -> usize {
    sentence
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Split whitespace-collapsed text after terminal punctuation
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);

        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let at_boundary = chars.get(i + 1).map_or(true, |n| n.is_whitespace());
        if !at_boundary || (c == '.' && ends_with_abbreviation(&current)) {
            continue;
        }

        let sentence = current.trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        current.clear();
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

fn ends_with_abbreviation(current: &str) -> bool {
    let last = match current.trim_end_matches('.').split_whitespace().last() {
        Some(word) => word.trim_start_matches(|c: char| !c.is_alphanumeric()),
        None => return false,
    };

    if last.contains('.') {
        // "U.S." style initialisms
        return true;
    }
    if last.chars().count() == 1 && last.chars().all(char::is_alphabetic) {
        return true;
    }
    ABBREVIATIONS.contains(&last.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ClaimNormalizer {
        ClaimNormalizer::default()
    }

    #[test]
    fn test_trims_and_collapses() {
        let claims = normalizer()
            .normalize("   Drinking \n\n bleach\tcures   COVID-19  ")
            .unwrap();
        assert_eq!(claims, vec!["Drinking bleach cures COVID-19".to_string()]);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            normalizer().normalize("   \n\t "),
            Err(VerifyError::InvalidClaim(_))
        ));
    }

    #[test]
    fn test_short_input_rejected() {
        assert!(matches!(
            normalizer().normalize("Vaccines bad"),
            Err(VerifyError::InvalidClaim(_))
        ));
        assert!(matches!(
            normalizer().normalize("!!! ??? ..."),
            Err(VerifyError::InvalidClaim(_))
        ));
    }

    #[test]
    fn test_idempotent() {
        let n = normalizer();
        let first = n
            .normalize("  The  Earth is flat.   Dr. Smith says so!  Wake up people ")
            .unwrap();
        for claim in &first {
            assert_eq!(n.normalize(claim).unwrap(), vec![claim.clone()]);
        }
    }

    #[test]
    fn test_segments_sentences() {
        let claims = normalizer()
            .normalize("The moon landing was staged. Vaccines contain microchips! Is 5G dangerous for everyone?")
            .unwrap();
        assert_eq!(claims.len(), 3);
        assert_eq!(claims[0], "The moon landing was staged.");
        assert_eq!(claims[2], "Is 5G dangerous for everyone?");
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let claims = normalizer()
            .normalize("Dr. Fauci said the U.S. economy is collapsing.")
            .unwrap();
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_near_duplicates_removed() {
        let claims = normalizer()
            .normalize("The earth is flat. the Earth is FLAT! Scientists agree the earth is round.")
            .unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0], "The earth is flat.");
    }

    #[test]
    fn test_reworded_duplicate_removed() {
        let claims = normalizer()
            .normalize("Drinking bleach cures COVID-19. drinking bleach cure covid 19 !")
            .unwrap();
        assert_eq!(claims, vec!["Drinking bleach cures COVID-19.".to_string()]);
    }

    #[test]
    fn test_overlap_below_threshold_kept() {
        // 5 shared terms of 5 and 7: dice 0.83
        let text = "Drinking bleach cures COVID-19. Drinking bleach cures COVID-19 in young children.";
        assert_eq!(normalizer().normalize(text).unwrap().len(), 2);

        let looser = ClaimNormalizer::new(NormalizerConfig {
            dedup_threshold: 0.8,
            ..Default::default()
        });
        assert_eq!(looser.normalize(text).unwrap().len(), 1);
    }

    #[test]
    fn test_short_sentences_skipped_within_article() {
        let claims = normalizer()
            .normalize("Wow. Bananas cure every known cancer. Really!")
            .unwrap();
        assert_eq!(claims, vec!["Bananas cure every known cancer.".to_string()]);
    }

    #[test]
    fn test_max_claims() {
        let config = NormalizerConfig {
            max_claims: 2,
            ..Default::default()
        };
        let claims = ClaimNormalizer::new(config)
            .normalize("One two three four. Five six seven eight. Nine ten eleven twelve.")
            .unwrap();
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn test_build_claims_keeps_source() {
        let claims = normalizer()
            .build_claims("Chemtrails are poisoning the water supply", Some("https://example.com/a"))
            .unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].source_url.as_deref(), Some("https://example.com/a"));
        assert_eq!(claims[0].normalized_text, "Chemtrails are poisoning the water supply");
    }
}
