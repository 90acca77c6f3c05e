//! Text helpers shared by the normalizer, classifiers and retriever
//!
//! Keyword matching works on a "match key": lowercased alphanumeric words
//! separated by single spaces, with apostrophes dropped so that "don't" and
//! "dont" compare equal. Similarity works on stemmed content terms.

use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "being", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "may",
    "might", "more", "much", "of", "on", "or", "our", "over", "she", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "to",
    "up", "very", "was", "we", "were", "what", "when", "which", "who", "will", "with", "would",
    "you", "your",
];

/// Negation words as they appear in a match key
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nor", "neither", "none", "nobody", "nothing", "cannot", "cant",
    "dont", "doesnt", "didnt", "isnt", "arent", "wasnt", "werent", "wont", "wouldnt",
    "shouldnt", "couldnt", "hasnt", "havent", "hadnt", "aint",
];

/// Remove control characters and collapse runs of whitespace into one space
pub fn collapse_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the match key for a text or phrase
pub fn match_key(text: &str) -> String {
    let mapped: String = text
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased words of a text, in order
pub fn words(text: &str) -> Vec<String> {
    match_key(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pre-computed match key for repeated phrase lookups against one text
#[derive(Debug, Clone)]
pub struct PhraseIndex {
    padded: String,
}

impl PhraseIndex {
    pub fn new(text: &str) -> Self {
        Self {
            padded: format!(" {} ", match_key(text)),
        }
    }

    /// Whole-word / whole-phrase containment
    pub fn contains(&self, phrase: &str) -> bool {
        let key = match_key(phrase);
        if key.is_empty() {
            return false;
        }
        self.padded.contains(&format!(" {} ", key))
    }

    /// Phrases from `phrases` present in the text, in list order
    pub fn hits<'a>(&self, phrases: &'a [String]) -> Vec<&'a str> {
        phrases
            .iter()
            .filter(|p| self.contains(p))
            .map(String::as_str)
            .collect()
    }
}

/// Light suffix stripping so inflections compare equal ("cures" / "cure")
pub fn stem(word: &str) -> String {
    let len = word.chars().count();
    if len > 5 && word.ends_with("ing") {
        return word[..word.len() - 3].to_string();
    }
    if len > 4 && word.ends_with("ed") {
        return word[..word.len() - 2].to_string();
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Stemmed, stop-word-filtered content terms
pub fn content_terms(text: &str) -> BTreeSet<String> {
    words(text)
        .into_iter()
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Dice coefficient of two term sets; 0.0 when either is empty
pub fn dice(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    (2 * shared) as f64 / (a.len() + b.len()) as f64
}

/// Whether the text contains a negation word
pub fn is_negated(text: &str) -> bool {
    words(text).iter().any(|w| NEGATIONS.contains(&w.as_str()))
}

/// Whether exactly one of the two texts is negated
pub fn polarity_differs(a: &str, b: &str) -> bool {
    is_negated(a) != is_negated(b)
}

/// Textual similarity in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    dice(&content_terms(a), &content_terms(b))
}
