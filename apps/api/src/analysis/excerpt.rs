//! Character- and token-bounded views of text.
//!
//! Lengths are counted in Unicode scalar values, never bytes, so a cut never
//! lands inside a multi-byte character.

/// Returns the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Keeps at most `max_tokens` whitespace-delimited tokens. Text already within
/// the bound is returned trimmed but otherwise untouched.
pub fn bound_tokens(text: &str, max_tokens: usize) -> String {
    let text = text.trim();
    if text.split_whitespace().count() <= max_tokens {
        return text.to_string();
    }
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}
