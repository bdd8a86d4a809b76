//! Extraction strategies and the fallback chain that runs them
//!
//! Design: each strategy turns the fetched page into text in its own way.
//! [`StrategyChain`] runs them in registration order and stops as soon as
//! the text collected so far is sufficient. Cheap strategies go first.

mod embedded;
mod openapi;
mod plain_text;
mod render;

pub use embedded::{collect_payloads, EmbeddedStateStrategy};
pub use openapi::{detect_spec_url, resolve_spec_url, OpenApiStrategy};
pub use plain_text::{extract_visible_text, PlainTextStrategy};
pub use render::RenderStrategy;

use crate::convert::{char_len, is_sufficient};
use crate::error::ExtractError;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

/// Fetched page handed to every strategy
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Page URL after redirects
    pub url: &'a Url,
    /// Raw HTML body
    pub html: &'a str,
}

/// How a strategy's yield is merged with the text collected so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adoption {
    /// Adopt only when strictly longer than the current text
    IfLonger,
    /// Adopt unconditionally
    Replace,
}

/// One way of turning a page into text
///
/// `attempt` distinguishes three outcomes: `Ok(None)` when the strategy does
/// not apply to this page, `Err` when it applied but failed, and
/// `Ok(Some(text))` for a yield.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Unique identifier (logging, progress reporting)
    fn name(&self) -> &'static str;

    fn adoption(&self) -> Adoption {
        Adoption::IfLonger
    }

    /// True if the yield comes from the external rendering service
    fn renders(&self) -> bool {
        false
    }

    async fn attempt(&self, page: &PageContext<'_>) -> Result<Option<String>, ExtractError>;
}

/// Text selected by a chain run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainOutcome {
    pub text: String,
    pub used_rendering: bool,
    /// Name of the strategy whose yield was adopted last
    pub strategy: Option<&'static str>,
}

/// Ordered, short-circuiting list of strategies
pub struct StrategyChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    sufficiency_threshold: usize,
}

impl StrategyChain {
    /// Create an empty chain
    pub fn new(sufficiency_threshold: usize) -> Self {
        Self {
            strategies: Vec::new(),
            sufficiency_threshold,
        }
    }

    /// Append a strategy; strategies run in registration order
    pub fn register(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.push(strategy);
    }

    /// Registered strategy names, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run the chain over `page`
    ///
    /// The first strategy always runs. Every later one runs only while the
    /// current text is below the sufficiency threshold. Strategy errors are
    /// logged and treated as no yield.
    pub async fn run(&self, page: &PageContext<'_>) -> ChainOutcome {
        self.run_with_progress(page, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_strategy` before each attempt
    pub async fn run_with_progress<F>(&self, page: &PageContext<'_>, mut on_strategy: F) -> ChainOutcome
    where
        F: FnMut(&'static str),
    {
        let mut outcome = ChainOutcome::default();

        for (index, strategy) in self.strategies.iter().enumerate() {
            let name = strategy.name();
            if index > 0 && is_sufficient(&outcome.text, self.sufficiency_threshold) {
                debug!(url = %page.url, chars = char_len(outcome.text.trim()), "Content sufficient, stopping");
                break;
            }

            on_strategy(name);
            let text = match strategy.attempt(page).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    debug!(url = %page.url, strategy = name, "Strategy declined");
                    continue;
                }
                Err(e) => {
                    warn!(url = %page.url, strategy = name, error = %e, "Strategy failed");
                    continue;
                }
            };

            let chars = char_len(text.trim());
            let adopt = match strategy.adoption() {
                Adoption::Replace => true,
                Adoption::IfLonger => chars > char_len(outcome.text.trim()),
            };
            if adopt {
                info!(url = %page.url, strategy = name, chars, "Adopted strategy output");
                outcome.text = text;
                outcome.strategy = Some(name);
                outcome.used_rendering = strategy.renders();
            } else {
                debug!(url = %page.url, strategy = name, chars, "Strategy output not longer, ignored");
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        name: &'static str,
        result: fn() -> Result<Option<String>, ExtractError>,
        adoption: Adoption,
        renders: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn boxed(
            name: &'static str,
            result: fn() -> Result<Option<String>, ExtractError>,
            calls: &Arc<AtomicUsize>,
        ) -> Box<Self> {
            Box::new(Self {
                name,
                result,
                adoption: Adoption::IfLonger,
                renders: false,
                calls: calls.clone(),
            })
        }
    }

    #[async_trait]
    impl ExtractionStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn adoption(&self) -> Adoption {
            self.adoption
        }

        fn renders(&self) -> bool {
            self.renders
        }

        async fn attempt(&self, _page: &PageContext<'_>) -> Result<Option<String>, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn page_url() -> Url {
        Url::parse("https://example.com/docs").unwrap()
    }

    #[tokio::test]
    async fn test_short_circuits_when_sufficient() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = StrategyChain::new(10);
        chain.register(Fixed::boxed("first", || Ok(Some("x".repeat(20))), &calls));
        chain.register(Fixed::boxed("second", || Ok(Some("y".repeat(50))), &calls));

        let url = page_url();
        let outcome = chain.run(&PageContext { url: &url, html: "" }).await;
        assert_eq!(outcome.text, "x".repeat(20));
        assert_eq!(outcome.strategy, Some("first"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_adopts_only_longer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = StrategyChain::new(1000);
        chain.register(Fixed::boxed("first", || Ok(Some("abcdef".into())), &calls));
        chain.register(Fixed::boxed("shorter", || Ok(Some("abc".into())), &calls));
        chain.register(Fixed::boxed("longer", || Ok(Some("abcdefghij".into())), &calls));

        let url = page_url();
        let outcome = chain.run(&PageContext { url: &url, html: "" }).await;
        assert_eq!(outcome.text, "abcdefghij");
        assert_eq!(outcome.strategy, Some("longer"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_declined_and_failed_are_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = StrategyChain::new(1000);
        chain.register(Fixed::boxed("first", || Ok(Some("base".into())), &calls));
        chain.register(Fixed::boxed("declines", || Ok(None), &calls));
        chain.register(Fixed::boxed(
            "fails",
            || Err(ExtractError::InvalidDocument("bad".into())),
            &calls,
        ));

        let url = page_url();
        let outcome = chain.run(&PageContext { url: &url, html: "" }).await;
        assert_eq!(outcome.text, "base");
        assert_eq!(outcome.strategy, Some("first"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_replace_marks_rendering() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = StrategyChain::new(1000);
        chain.register(Fixed::boxed("first", || Ok(Some("a longer static text".into())), &calls));
        chain.register(Box::new(Fixed {
            name: "render",
            result: || Ok(Some("short".into())),
            adoption: Adoption::Replace,
            renders: true,
            calls: calls.clone(),
        }));

        let url = page_url();
        let mut seen = Vec::new();
        let outcome = chain
            .run_with_progress(&PageContext { url: &url, html: "" }, |name| seen.push(name))
            .await;
        assert_eq!(outcome.text, "short");
        assert!(outcome.used_rendering);
        assert_eq!(seen, vec!["first", "render"]);
    }

    #[test]
    fn test_chain_names() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = StrategyChain::new(200);
        assert!(chain.is_empty());
        chain.register(Fixed::boxed("a", || Ok(None), &calls));
        chain.register(Fixed::boxed("b", || Ok(None), &calls));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.names(), vec!["a", "b"]);
    }
}
