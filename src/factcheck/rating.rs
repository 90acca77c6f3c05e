//! Normalization of publisher textual ratings into verdicts

use crate::claims::FactCheckVerdict;
use crate::text::PhraseIndex;

const UNVERIFIED: &[&str] = &[
    "unverified", "unproven", "not yet rated", "unrated", "research in progress",
    "information", "analysis needed", "no rating", "needs context",
];
const DEFINITELY_FALSE: &[&str] = &["mostly false", "pants on fire"];
const MIXED: &[&str] = &[
    "half true", "half false", "mixed", "mixture", "misleading", "partly false", "partly true",
    "partially true", "partially false", "missing context", "varies", "out of context",
    "exaggerated", "distorts the facts",
];
const FALSE: &[&str] = &[
    "false", "incorrect", "fake", "hoax", "debunked", "wrong", "not true", "inaccurate", "fabricated",
    "no evidence", "baseless", "scam", "four pinocchios", "satire",
];
const TRUE: &[&str] = &[
    "true", "mostly true", "correct", "accurate", "fact based", "confirmed", "verified", "legit",
];

/// Map a textual rating ("Pants on Fire", "Half True", "Fact-Based") to a verdict
///
/// Checks run from most to least specific so that "Mostly False" is false,
/// "Half True" is mixed and "Not true" is false.
pub fn normalize_rating(rating: &str) -> FactCheckVerdict {
    let index = PhraseIndex::new(rating);
    let any = |phrases: &[&str]| phrases.iter().any(|p| index.contains(p));

    if any(UNVERIFIED) {
        return FactCheckVerdict::Unverified;
    }
    if any(DEFINITELY_FALSE) {
        return FactCheckVerdict::False;
    }
    if any(MIXED) {
        return FactCheckVerdict::Mixed;
    }
    if any(FALSE) {
        return FactCheckVerdict::False;
    }
    if any(TRUE) {
        return FactCheckVerdict::True;
    }
    FactCheckVerdict::Unverified
}
