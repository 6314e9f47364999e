//! Small text helpers

/// Truncate to at most `max` characters, appending an ellipsis when cut
///
/// Works on characters, not bytes, so multi-byte text never splits mid-codepoint.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((idx, _)) => format!("{}...", &text[..idx]),
    }
}
