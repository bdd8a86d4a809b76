//! Text normalization utilities shared by all strategies

use scraper::Html;

/// Marker appended to text cut at the length bound
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Filter excessive newlines: runs of 3 or more become exactly 2
pub fn collapse_newlines(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push(c);
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}

/// Collapse every whitespace run (including newlines) into a single space
pub fn squash_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Number of characters (not bytes)
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `max_chars` characters of `s`
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Cut `s` to `max_chars` characters and append [`TRUNCATION_MARKER`]
///
/// Text at or under the bound is returned unchanged. Applying this twice
/// yields the same string as applying it once.
pub fn truncate_with_marker(s: &str, max_chars: usize) -> String {
    if char_len(s) <= max_chars {
        return s.to_string();
    }
    let mut out = take_chars(s, max_chars).to_string();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Collapse newlines, trim, then bound the length
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    truncate_with_marker(collapse_newlines(s).trim(), max_chars)
}

/// True when the trimmed text has at least `threshold` characters
pub fn is_sufficient(text: &str, threshold: usize) -> bool {
    char_len(text.trim()) >= threshold
}

/// Check whether a string carries HTML tags
pub fn looks_like_markup(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.windows(2).any(|w| {
        w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'/' || w[1] == b'!')
    }) && s.contains('>')
}

/// Render an HTML fragment to its visible text, one text node per line
pub fn markup_to_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    html.root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_newlines() {
        let input = "line1\n\n\n\n\nline2";
        assert_eq!(collapse_newlines(input), "line1\n\nline2");
        assert_eq!(collapse_newlines("a\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn test_collapse_newlines_idempotent() {
        let inputs = ["a\n\n\n\nb\n\n\nc", "\n\n\n", "plain", "x\n\ny"];
        for input in inputs {
            let once = collapse_newlines(input);
            assert_eq!(collapse_newlines(&once), once);
            assert!(!once.contains("\n\n\n"));
        }
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(
            squash_whitespace("  hello   world \n\n test  "),
            "hello world test"
        );
        assert_eq!(squash_whitespace(""), "");
    }

    #[test]
    fn test_take_chars_multibyte() {
        assert_eq!(take_chars("héllo wörld", 4), "héll");
        assert_eq!(take_chars("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_under_bound_unmodified() {
        let text = "short text";
        assert_eq!(truncate_with_marker(text, 100), text);
        let exact = "x".repeat(100);
        assert_eq!(truncate_with_marker(&exact, 100), exact);
    }

    #[test]
    fn test_truncate_over_bound() {
        let text = "y".repeat(150);
        let out = truncate_with_marker(&text, 100);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(char_len(&out), 100 + char_len(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_idempotent() {
        let text = "z".repeat(500);
        let once = truncate_with_marker(&text, 100);
        assert_eq!(truncate_with_marker(&once, 100), once);
    }

    #[test]
    fn test_normalize_text() {
        let text = "\n\n  a\n\n\n\nb  \n";
        assert_eq!(normalize_text(text, 100), "a\n\nb");
    }

    #[test]
    fn test_is_sufficient() {
        assert!(is_sufficient("  abcde  ", 5));
        assert!(!is_sufficient("  abcd  ", 5));
        assert!(is_sufficient("", 0));
    }

    #[test]
    fn test_looks_like_markup() {
        assert!(looks_like_markup("<p>Hello</p>"));
        assert!(looks_like_markup("text with <strong>bold</strong> words"));
        assert!(!looks_like_markup("a < b and c > d"));
        assert!(!looks_like_markup("no tags here"));
    }

    #[test]
    fn test_markup_to_text() {
        let text = markup_to_text("<p>Set the <b>billing</b> account</p><p>Second &amp; last</p>");
        assert_eq!(text, "Set the\nbilling\naccount\nSecond & last");
    }
}
