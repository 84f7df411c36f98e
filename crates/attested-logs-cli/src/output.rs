//! Output helpers for table-ish terminal rendering.

/// Truncate a string for column display, appending an ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Flatten a content string to one displayable line.
pub fn one_line(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}
