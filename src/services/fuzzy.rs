//! Similarity scoring for typo-tolerant matching.
//!
//! The score is `2 * M / (len(a) + len(b))`, where `M` is the number of
//! characters in the longest common subsequence of the two strings. It is
//! 1.0 only for identical strings and tolerates a transposed or dropped
//! letter in short words better than a raw edit-distance threshold.

/// Default acceptance threshold for single words.
pub const DEFAULT_WORD_CUTOFF: f64 = 0.82;

/// Default acceptance threshold for whole officer names.
pub const DEFAULT_NAME_CUTOFF: f64 = 0.86;

/// Similarity ratio in `[0, 1]` between two strings.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();

    if total == 0 {
        return 1.0;
    }

    2.0 * longest_common_subsequence(&a, &b) as f64 / total as f64
}

/// True if `query_word` equals one of `candidate_words`, or is at least
/// `cutoff` similar to one of them.
pub fn word_matches<S: AsRef<str>>(query_word: &str, candidate_words: &[S], cutoff: f64) -> bool {
    if candidate_words
        .iter()
        .any(|word| word.as_ref() == query_word)
    {
        return true;
    }

    candidate_words
        .iter()
        .any(|word| string_similarity(query_word, word.as_ref()) >= cutoff)
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Single rolling row over `b`.
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}
