//! Stopword lists
//!
//! Lists use a flat bracketed format: `["a", "about", "above", ...]`. Quotes
//! (single or double) and surrounding whitespace around each item are ignored.

use crate::index::{IndexError, IndexResult};
use std::collections::HashSet;
use std::path::Path;

/// English stopwords used when no list file is configured
pub const BUILTIN_STOPWORDS: &str = r#"[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does",
    "doesn't", "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had",
    "hadn't", "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her",
    "here", "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd",
    "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself",
    "let's", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some", "such", "than",
    "that", "that's", "the", "their", "theirs", "them", "themselves", "then", "there", "there's",
    "these", "they", "they'd", "they'll", "they're", "they've", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're",
    "we've", "were", "weren't", "what", "what's", "when", "when's", "where", "where's", "which",
    "while", "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "you",
    "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves"
]"#;

/// Parses a bracketed, comma-separated list of quoted words
///
/// A JSON array of strings is read as JSON, so escapes and commas inside
/// items are kept. Anything else (single quotes, trailing commas) goes
/// through a lenient split on commas. Items are lowercased; empty items are
/// dropped.
pub fn parse_stopwords(content: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(content) {
        Ok(items) => items
            .into_iter()
            .map(|item| item.trim().to_lowercase())
            .filter(|item| !item.is_empty())
            .collect(),
        Err(_) => parse_lenient(content),
    }
}

fn parse_lenient(content: &str) -> Vec<String> {
    let list = content.trim();
    let list = list.strip_prefix('[').unwrap_or(list);
    let list = list.strip_suffix(']').unwrap_or(list);

    list.split(',')
        .map(|item| item.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace()))
        .filter(|item| !item.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Reads and parses a stopword list file
pub fn load_stopwords(path: &Path) -> IndexResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| IndexError::Stopwords {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_stopwords(&content))
}

/// The built-in English list as a set
pub fn builtin_stopwords() -> HashSet<String> {
    parse_stopwords(BUILTIN_STOPWORDS).into_iter().collect()
}
