//! Client-rendered pages that ship their content as embedded JSON
//!
//! Next.js, Nuxt, Redux and Apollo apps serialize the data needed to render
//! the page into the HTML. When the visible markup is an empty shell, that
//! payload is often the only place the documentation text lives.

use super::{ExtractionStrategy, PageContext};
use crate::convert::normalize_text;
use crate::error::ExtractError;
use crate::structured::TextCollector;
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static NEXT_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());
static INLINE_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script:not([src])").unwrap());
static JSON_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/json"]"#).unwrap());
static LD_JSON_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// `window.<global> =` assignments of known state containers
static STATE_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"window\.(?:__NUXT__|__INITIAL_STATE__|__PRELOADED_STATE__|__APOLLO_STATE__)\s*=\s*",
    )
    .unwrap()
});

/// Parse every embedded state payload found in `html`
///
/// Sources, in order: `script#__NEXT_DATA__`, `window.__NUXT__` /
/// `__INITIAL_STATE__` / `__PRELOADED_STATE__` / `__APOLLO_STATE__`
/// assignments whose value is a JSON literal, other
/// `script[type="application/json"]` blocks, then JSON-LD. Payloads that do
/// not parse are skipped.
pub fn collect_payloads(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let mut payloads = Vec::new();

    for script in document.select(&NEXT_DATA) {
        push_parsed(&mut payloads, &script.text().collect::<String>(), "__NEXT_DATA__");
    }

    for script in document.select(&INLINE_SCRIPT) {
        let body: String = script.text().collect();
        for assignment in STATE_ASSIGNMENT.find_iter(&body) {
            if let Some(value) = leading_json_value(&body[assignment.end()..]) {
                payloads.push(value);
            }
        }
    }

    for script in document.select(&JSON_SCRIPT) {
        if script.value().id() == Some("__NEXT_DATA__") {
            continue;
        }
        push_parsed(&mut payloads, &script.text().collect::<String>(), "application/json");
    }

    for script in document.select(&LD_JSON_SCRIPT) {
        push_parsed(&mut payloads, &script.text().collect::<String>(), "ld+json");
    }

    payloads
}

fn push_parsed(payloads: &mut Vec<Value>, raw: &str, source: &'static str) {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => payloads.push(value),
        Err(e) => debug!(source, error = %e, "Skipping unparsable embedded payload"),
    }
}

/// First JSON value at the start of `rest`, ignoring whatever follows it
fn leading_json_value(rest: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(rest.trim_start())
        .into_iter::<Value>()
        .next()
        .and_then(Result::ok)
}

/// Extract narrative text from embedded framework state
#[derive(Debug, Clone)]
pub struct EmbeddedStateStrategy {
    max_chars: usize,
}

impl EmbeddedStateStrategy {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl ExtractionStrategy for EmbeddedStateStrategy {
    fn name(&self) -> &'static str {
        "embedded_state"
    }

    async fn attempt(&self, page: &PageContext<'_>) -> Result<Option<String>, ExtractError> {
        let payloads = collect_payloads(page.html);
        if payloads.is_empty() {
            return Ok(None);
        }

        let mut collector = TextCollector::new();
        for payload in &payloads {
            collector.collect(payload);
        }
        if collector.is_empty() {
            return Ok(None);
        }

        debug!(url = %page.url, payloads = payloads.len(), "Collected embedded state text");
        Ok(Some(normalize_text(&collector.finish(), self.max_chars)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    const PROSE: &str = "Duties and taxes can be billed to a third-party account.";

    #[test]
    fn test_next_data() {
        let html = format!(
            r#"<script id="__NEXT_DATA__" type="application/json">{{"props":{{"pageProps":{{"body":"{}"}}}},"buildId":"abc"}}</script>"#,
            PROSE
        );
        let payloads = collect_payloads(&html);
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["props"]["pageProps"]["body"], PROSE);
    }

    #[test]
    fn test_window_assignment_ignores_trailing_code() {
        let html = r#"<script>window.__INITIAL_STATE__ = {"doc": {"text": "x"}}; window.boot();</script>"#;
        let payloads = collect_payloads(html);
        assert_eq!(payloads, vec![json!({"doc": {"text": "x"}})]);
    }

    #[test]
    fn test_non_json_assignment_skipped() {
        let html = r#"<script>window.__NUXT__=(function(a,b){return {data:[a]}}("x",1));</script>"#;
        assert!(collect_payloads(html).is_empty());
    }

    #[test]
    fn test_json_and_ld_json() {
        let html = r#"
            <script type="application/json">{"content": "a"}</script>
            <script type="application/ld+json">{"@type": "Article", "articleBody": "b"}</script>
            <script type="application/json">{not json</script>"#;
        let payloads = collect_payloads(html);
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0]["content"], "a");
        assert_eq!(payloads[1]["articleBody"], "b");
    }

    #[test]
    fn test_next_data_not_double_counted() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"a": 1}</script>"#;
        assert_eq!(collect_payloads(html).len(), 1);
    }

    #[tokio::test]
    async fn test_strategy_collects_text() {
        let html = format!(
            r#"<html><body><div id="__next"></div>
            <script id="__NEXT_DATA__" type="application/json">{{"props":{{"pageProps":{{"content":"{p}","slug":"a-long-slug-that-should-never-appear"}}}}}}</script>
            <script type="application/ld+json">{{"description":"{p}"}}</script>
            </body></html>"#,
            p = PROSE
        );
        let url = Url::parse("https://example.com").unwrap();
        let strategy = EmbeddedStateStrategy::new(12_000);
        let text = strategy
            .attempt(&PageContext { url: &url, html: &html })
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some(PROSE));
    }

    #[tokio::test]
    async fn test_strategy_declines_without_payloads() {
        let url = Url::parse("https://example.com").unwrap();
        let strategy = EmbeddedStateStrategy::new(12_000);
        let page = PageContext {
            url: &url,
            html: "<html><body><p>nothing embedded</p></body></html>",
        };
        assert_eq!(strategy.attempt(&page).await.unwrap(), None);
    }
}
