//! Shared utility functions.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character. Returns a sub-slice of the input; short inputs come back
/// unchanged.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_ascii() {
        assert_eq!(truncate_str("candidate body", 9), "candidate");
    }

    #[test]
    fn short_input_unchanged() {
        assert_eq!(truncate_str("ok", 10), "ok");
    }

    #[test]
    fn backs_up_to_char_boundary() {
        // 'é' is 2 bytes; cutting at byte 3 lands mid-char
        let s = "éé";
        assert_eq!(truncate_str(s, 3), "é");
        assert_eq!(truncate_str(s, 4), "éé");
    }

    #[test]
    fn empty_input() {
        assert_eq!(truncate_str("", 4), "");
    }
}
