//! Visible text with boilerplate removed

use super::{ExtractionStrategy, PageContext};
use crate::convert::normalize_text;
use crate::error::ExtractError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Subtrees dropped before flattening
static REMOVED: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, nav, footer, header, iframe, noscript").unwrap()
});

/// Content roots, most specific first
static CONTENT_ROOTS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        Selector::parse("main").unwrap(),
        Selector::parse("article").unwrap(),
        Selector::parse(r#"[role="main"]"#).unwrap(),
    ]
});

/// Extract the visible text of an HTML document
///
/// Scripts, styles, navigation, headers, footers, iframes and noscript
/// blocks are removed first. Text is taken from the first `main`,
/// `article` or `[role=main]` element, or from the whole document when
/// none exists. Text nodes are trimmed and joined with newlines, then
/// collapsed and bounded to `max_chars`.
pub fn extract_visible_text(html: &str, max_chars: usize) -> String {
    let mut document = Html::parse_document(html);

    let removed: Vec<_> = document.select(&REMOVED).map(|el| el.id()).collect();
    for id in removed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    // Html::select also visits detached nodes; search from the root instead
    let html_root = document.root_element();
    let root = CONTENT_ROOTS
        .iter()
        .find_map(|selector| html_root.select(selector).next())
        .unwrap_or(html_root);

    normalize_text(&element_text(root), max_chars)
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First strategy of the chain: the page's own visible text
#[derive(Debug, Clone)]
pub struct PlainTextStrategy {
    max_chars: usize,
}

impl PlainTextStrategy {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl ExtractionStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    async fn attempt(&self, page: &PageContext<'_>) -> Result<Option<String>, ExtractError> {
        let text = extract_visible_text(page.html, self.max_chars);
        Ok((!text.is_empty()).then_some(text))
    }
}
