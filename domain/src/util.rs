//! Text helpers for log previews and error bodies.

/// Longest prefix of `s` that fits in `max_bytes` and ends on a character
/// boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview of model output: whitespace runs collapse to one
/// space and anything past `max_bytes` becomes `...`.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_str(&flat, max_bytes);
    if cut.len() < flat.len() {
        format!("{}...", cut.trim_end())
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_char_boundaries() {
        assert_eq!(truncate_str("moderator", 3), "mod");
        assert_eq!(truncate_str("ok", 10), "ok");
        // 'é' is two bytes; cutting inside it backs up
        assert_eq!(truncate_str("café", 4), "caf");
        assert_eq!(truncate_str("café", 5), "café");
    }

    #[test]
    fn test_preview_flattens_lines() {
        assert_eq!(
            preview("!allowspeak planner\n\n!yield", 100),
            "!allowspeak planner !yield"
        );
    }

    #[test]
    fn test_preview_marks_truncation() {
        assert_eq!(preview("Phase one covers hiring", 10), "Phase one...");
        assert_eq!(preview("", 10), "");
    }
}
