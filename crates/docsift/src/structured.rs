//! Collect human-readable text from arbitrary JSON
//!
//! Embedded framework state (`__NEXT_DATA__`, Nuxt payloads, JSON-LD, ...)
//! mixes narrative text with identifiers, URLs, build hashes and styling.
//! [`TextCollector`] walks such a value depth-first, keeps strings that read
//! like prose and drops the rest.

use crate::convert::{looks_like_markup, markup_to_text, squash_whitespace};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Deepest nesting level that still contributes text
pub const MAX_WALK_DEPTH: usize = 15;

/// Strings shorter than this are never narrative
pub const MIN_TEXT_CHARS: usize = 30;

/// Keys visited first because they usually hold narrative content
pub const PRIORITY_KEYS: &[&str] = &[
    "content",
    "body",
    "text",
    "description",
    "html",
    "markdown",
    "raw",
    "title",
    "heading",
    "paragraph",
    "excerpt",
    "summary",
    "articleBody",
    "mainEntity",
    "pageContent",
    "renderedContent",
];

/// Keys skipped outright: identifiers, routing, build/runtime config, styling
pub const SKIP_KEYS: &[&str] = &[
    "id",
    "_id",
    "uuid",
    "key",
    "url",
    "href",
    "src",
    "srcSet",
    "slug",
    "path",
    "route",
    "asPath",
    "pathname",
    "query",
    "buildId",
    "assetPrefix",
    "runtimeConfig",
    "publicRuntimeConfig",
    "serverRuntimeConfig",
    "isFallback",
    "gssp",
    "gsp",
    "gip",
    "appGip",
    "scriptLoader",
    "locale",
    "locales",
    "defaultLocale",
    "__typename",
    "className",
    "class",
    "style",
    "styles",
    "css",
    "theme",
    "color",
    "colors",
    "font",
    "fonts",
    "logo",
    "favicon",
    "icon",
    "image",
    "images",
];

static URL_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*:|//|www\.)\S*$").unwrap()
});
static PATH_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.{0,2}/?(?:[\w.~%@:-]+/)+[\w.~%@:-]*/?$").unwrap());
static UUID_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});
static HASH_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{16,}$").unwrap());
static BASE64_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:data:[\w/+.-]+;base64,)?[A-Za-z0-9+/_-]{24,}={0,2}$").unwrap());
static CODE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        ^\s*(?:function\b|const\s|let\s|var\s|import\s|export\s|return\s|\(\s*\)\s*=>)
        | ^\s*\{\s*["']?\w+["']?\s*:
        | ^\s*\[\s*[{"'\d]
        | =>\s*[{(]
        | \bfunction\s*\(
        | [;{}]\s*$
        | \w\([^()]*\)\s*;
        | \b(?:document|window)\.\w+
        "#,
    )
    .unwrap()
});

/// Check whether a candidate string is noise rather than narrative
///
/// Expects whitespace-squashed input.
pub fn is_noise(s: &str) -> bool {
    if s.chars().count() < MIN_TEXT_CHARS {
        return true;
    }
    if UUID_LIKE.is_match(s) || HASH_LIKE.is_match(s) || BASE64_LIKE.is_match(s) {
        return true;
    }
    if URL_LIKE.is_match(s) || PATH_LIKE.is_match(s) {
        return true;
    }
    if CODE_LIKE.is_match(s) {
        return true;
    }
    // Single long token: identifiers, class lists joined by dashes, etc.
    !s.contains(' ')
}

/// Depth-bounded text collector
///
/// One collector is used per extraction run; repeated strings are emitted
/// once.
#[derive(Debug, Default)]
pub struct TextCollector {
    seen: HashSet<String>,
    parts: Vec<String>,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `value` and record the narrative strings it contains
    pub fn collect(&mut self, value: &Value) {
        self.walk(value, 0);
    }

    /// Collected strings joined by newlines
    pub fn finish(self) -> String {
        self.parts.join("\n")
    }

    /// True if nothing was collected yet
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn walk(&mut self, value: &Value, depth: usize) {
        if depth > MAX_WALK_DEPTH {
            return;
        }
        match value {
            Value::String(s) => self.push_string(s),
            Value::Array(items) => {
                for item in items {
                    self.walk(item, depth + 1);
                }
            }
            Value::Object(map) => {
                for key in PRIORITY_KEYS {
                    if let Some(child) = map.get(*key) {
                        self.walk(child, depth + 1);
                    }
                }
                for (key, child) in map {
                    if PRIORITY_KEYS.contains(&key.as_str()) || SKIP_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    self.walk(child, depth + 1);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn push_string(&mut self, raw: &str) {
        let text = if looks_like_markup(raw) {
            squash_whitespace(&markup_to_text(raw))
        } else {
            squash_whitespace(raw)
        };
        if is_noise(&text) {
            return;
        }
        if self.seen.insert(text.clone()) {
            self.parts.push(text);
        }
    }
}

/// Collect narrative text from a single JSON value
pub fn extract_text(value: &Value) -> String {
    let mut collector = TextCollector::new();
    collector.collect(value);
    collector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NARRATIVE: &str = "Bill duties and taxes to the receiver account";

    #[test]
    fn test_short_string_discarded() {
        assert_eq!(extract_text(&json!("ten chars!")), "");
    }

    #[test]
    fn test_narrative_string_kept() {
        let forty = "Set the duties payer to a third party now";
        assert_eq!(forty.chars().count(), 41);
        assert_eq!(extract_text(&json!(forty)), forty);
    }

    #[test]
    fn test_uuid_discarded() {
        assert_eq!(
            extract_text(&json!("123e4567-e89b-12d3-a456-426614174000")),
            ""
        );
    }

    #[test]
    fn test_noise_patterns() {
        assert!(is_noise("https://example.com/some/long/path/to/resource"));
        assert!(is_noise("/_next/static/chunks/pages/index-abc123.js"));
        assert!(is_noise("d41d8cd98f00b204e9800998ecf8427e"));
        assert!(is_noise("iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk"));
        assert!(is_noise("function(e){return e&&e.__esModule?e:{default:e}}"));
        assert!(is_noise("const handler = () => { window.location.reload() }"));
        assert!(is_noise("flex-items-center-justify-between-px-4-py-2-rounded"));
        assert!(!is_noise(NARRATIVE));
        assert!(!is_noise("Configure the EORI number under Settings, then save."));
        assert!(is_noise(r#"{"accountId": 42, "payer": "third_party"}"#));
        assert!(is_noise(r#"["billing", "duties", "taxes", "shipping"]"#));
        assert!(is_noise("trackEvent('checkout', payload); refresh"));
    }

    #[test]
    fn test_prose_with_brackets_kept() {
        for prose in [
            "Use the v2 API (recommended); it supports third-party duties billing.",
            "[Beta] Configure the EORI number before the first shipment.",
        ] {
            assert!(!is_noise(prose), "dropped: {}", prose);
        }
    }

    #[test]
    fn test_markup_reduced_to_text() {
        let value = json!({"html": "<p>Enter the <strong>VAT number</strong> in the customs form field.</p>"});
        assert_eq!(
            extract_text(&value),
            "Enter the VAT number in the customs form field."
        );
    }

    #[test]
    fn test_priority_keys_first() {
        let value = json!({
            "zzz": "This trailing member should come after the body text.",
            "body": "The body content describes how to add a billing account."
        });
        assert_eq!(
            extract_text(&value),
            "The body content describes how to add a billing account.\nThis trailing member should come after the body text."
        );
    }

    #[test]
    fn test_skip_keys_ignored() {
        let value = json!({
            "buildId": "Some build identifier that is long enough to pass",
            "runtimeConfig": {"note": "Runtime configuration text that is long enough"},
            "props": {"pageProps": {"intro": NARRATIVE}}
        });
        assert_eq!(extract_text(&value), NARRATIVE);
    }

    #[test]
    fn test_duplicates_emitted_once() {
        let value = json!([NARRATIVE, {"text": NARRATIVE}, [NARRATIVE]]);
        assert_eq!(extract_text(&value), NARRATIVE);
    }

    fn nest(depth: usize) -> Value {
        let mut value = json!(NARRATIVE);
        for _ in 0..depth {
            value = json!([value]);
        }
        value
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(extract_text(&nest(MAX_WALK_DEPTH)), NARRATIVE);
        assert_eq!(extract_text(&nest(MAX_WALK_DEPTH + 1)), "");
        assert_eq!(extract_text(&nest(40)), "");
    }

    #[test]
    fn test_scalars_ignored() {
        assert_eq!(extract_text(&json!({"a": 1, "b": true, "c": null})), "");
    }
}
