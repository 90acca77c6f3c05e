//! HTML to plain text

use crate::text::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<head\b.*?</head\s*>|<nav\b.*?</nav\s*>|<footer\b.*?</footer\s*>|<aside\b.*?</aside\s*>|<form\b.*?</form\s*>",
    )
    .expect("boilerplate pattern")
});

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").expect("paragraph pattern"));

static BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(h[1-6]|li|div|section|article|tr|blockquote)\s*>|<br\s*/?>")
        .expect("block pattern")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});").expect("entity pattern")
});

/// Main text of an HTML page
///
/// Paragraph text is preferred; pages without `<p>` content fall back to all
/// visible text.
pub fn html_to_text(html: &str) -> String {
    let cleaned = BOILERPLATE.replace_all(html, " ");

    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(&cleaned)
        .filter_map(|caps| caps.get(1))
        .map(|inner| fragment_text(inner.as_str()))
        .filter(|text| !text.is_empty())
        .collect();

    if !paragraphs.is_empty() {
        return paragraphs.join("\n");
    }

    let blocks = BLOCK_END.replace_all(&cleaned, "\n");
    fragment_text(&blocks)
}

fn fragment_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    collapse_whitespace(&decode_entities(&stripped))
}

/// Decode named and numeric character references
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        _ => return None,
    };
    Some(c)
}
