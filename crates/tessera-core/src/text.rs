//! Tokenization shared by ingestion (keyword derivation) and sparse activation
//! (query keywords). Both sides must agree for postings to match.

use std::collections::BTreeSet;

/// Words too common to discriminate between paragraphs.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its",
    "itself", "just", "more", "most", "myself", "nor", "not", "now", "off", "once", "only",
    "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "too", "under", "until", "very", "was",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Lowercased alphanumeric tokens in order of appearance, duplicates kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|s| s.trim_matches('\''))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

/// Distinct keywords in order of first appearance: tokens of at least
/// `min_chars` characters that are not stop words.
pub fn extract_keywords(text: &str, min_chars: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() >= min_chars && !is_stop_word(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}
