use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ALNUM_RUN: Regex = Regex::new(r"[A-Za-z0-9]+").unwrap();
}

/// Normalize text for matching: maximal ASCII alphanumeric runs, lowercased,
/// joined by single spaces. Everything else is a separator.
pub fn normalize(text: &str) -> String {
    ALNUM_RUN
        .find_iter(text)
        .map(|run| run.as_str().to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into normalized tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
