pub const PREVIEW_MAX_CHARS: usize = 150;

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line preview of a conversation body, cut at `PREVIEW_MAX_CHARS`
/// characters with `...` appended when cut.
pub fn preview(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() > PREVIEW_MAX_CHARS {
        let mut cut: String = collapsed.chars().take(PREVIEW_MAX_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        collapsed
    }
}
