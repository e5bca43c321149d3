//! Question normalization and phrase lookup helpers.
//!
//! Every later stage works on the normalized form, so vocabularies loaded
//! from configuration are normalized with the same function.

/// Trim, lower-case and collapse interior whitespace runs to one space.
///
/// Total: any input, including the empty string, produces a value.
pub fn normalize(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Substring lookup, used for smart-rule and intent keywords.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    !phrase.is_empty() && text.contains(phrase)
}

/// Position of the first occurrence of `term` that starts a word.
///
/// The term may run into a longer word ("vendu" matches "vendus") but may not
/// start in the middle of one ("top" does not match "stop").
pub fn find_term(text: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }
    text.match_indices(term)
        .map(|(idx, _)| idx)
        .find(|&idx| starts_word(text, idx))
}

pub fn contains_term(text: &str, term: &str) -> bool {
    find_term(text, term).is_some()
}

/// Position of the first occurrence of `word` bounded on both sides.
pub fn find_word(text: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    text.match_indices(word)
        .map(|(idx, _)| idx)
        .find(|&idx| starts_word(text, idx) && ends_word(text, idx + word.len()))
}

/// Position of the first word-bounded occurrence that lies outside `masked`.
pub fn find_word_outside(
    text: &str,
    word: &str,
    masked: &[std::ops::Range<usize>],
) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    text.match_indices(word).map(|(idx, _)| idx).find(|&idx| {
        starts_word(text, idx)
            && ends_word(text, idx + word.len())
            && !masked.iter().any(|span| span.contains(&idx))
    })
}

fn starts_word(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}

fn ends_word(text: &str, idx: usize) -> bool {
    text[idx..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric())
}
