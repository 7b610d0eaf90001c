//! Small text utilities: character-safe truncation and document statistics.

/// Return the longest prefix of `s` containing at most `max` characters.
///
/// Operates on `char` boundaries, so multi-byte text is never split
/// mid-character.
pub fn take_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate `s` to `max` characters, appending `...` if anything was cut.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let prefix = take_chars(s, max);
    if prefix.len() < s.len() {
        format!("{}...", prefix)
    } else {
        prefix.to_string()
    }
}

/// Whitespace-separated word count.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Estimated reading time in whole minutes, at least 1.
pub fn reading_time_minutes(s: &str, words_per_minute: usize) -> usize {
    std::cmp::max(1, word_count(s) / words_per_minute.max(1))
}
