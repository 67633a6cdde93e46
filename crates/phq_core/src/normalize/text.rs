/// Collapse `\r\n` and bare `\r` to `\n` so paragraph splitting sees one line-ending style.
pub fn normalize_line_endings(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// First `max_chars` characters of `text`, trimmed, followed by `...`.
///
/// Counts characters rather than bytes so multi-byte text never splits mid code point.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_crlf_and_cr() {
        assert_eq!(normalize_line_endings("a\r\n\r\nb\rc"), "a\n\nb\nc");
    }

    #[test]
    fn excerpt_is_char_aware_and_always_ellipsized() {
        assert_eq!(excerpt("short", 60), "short...");
        let long = "é".repeat(80);
        let got = excerpt(&long, 60);
        assert_eq!(got.chars().count(), 63);
        assert!(got.ends_with("..."));
    }

    #[test]
    fn excerpt_trims_the_head_before_ellipsizing() {
        assert_eq!(excerpt("  The general will   is always right", 16), "The general wi...");
        assert_eq!(excerpt("The general will   is always right", 19), "The general will...");
    }

    #[test]
    fn counts_words_across_newlines() {
        assert_eq!(word_count("one two\nthree\n\n four"), 4);
    }
}
