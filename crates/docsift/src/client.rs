//! Extraction entry points
//!
//! [`Extractor`] fetches a page once and runs the strategy chain over it:
//! plain text, then the page's OpenAPI specification, then embedded
//! framework state, then (only with a rendering key) an external JS render.
//! The individual strategies live in [`strategies`](crate::strategies).

use crate::convert::{char_len, normalize_text};
use crate::error::ExtractError;
use crate::http::{HttpPageFetcher, PageFetcher, PageRequest};
use crate::keywords::KeywordSet;
use crate::render::{HttpRenderService, Renderer};
use crate::strategies::{
    EmbeddedStateStrategy, OpenApiStrategy, PageContext, PlainTextStrategy, RenderStrategy,
    StrategyChain,
};
use crate::tool::ToolStatus;
use crate::types::{ExtractRequest, ExtractionResult};
use crate::DEFAULT_USER_AGENT;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Deadline for the primary page fetch
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(15);
/// Deadline for fetching a detected API specification
pub const DEFAULT_SPEC_TIMEOUT: Duration = Duration::from_secs(20);
/// Deadline for the external rendering service
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Text at or above this many characters stops the chain
pub const DEFAULT_SUFFICIENCY_THRESHOLD: usize = 200;
/// Text below this many characters is rejected by [`Extractor::extract_checked`]
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 50;
/// Bound on returned text (truncation marker excluded)
pub const DEFAULT_MAX_CHARS: usize = 12_000;

/// Extraction options
///
/// Everything the pipeline needs is passed here; the library never reads
/// the environment.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Custom User-Agent (default: a desktop browser string)
    pub user_agent: Option<String>,
    pub page_timeout: Duration,
    pub spec_timeout: Duration,
    pub render_timeout: Duration,
    /// Rendering service key; the render strategy only runs when set
    pub render_api_key: Option<String>,
    /// Rendering service endpoint override
    pub render_endpoint: Option<String>,
    pub sufficiency_threshold: usize,
    pub min_content_chars: usize,
    pub max_chars: usize,
    /// Vocabulary used to pick relevant endpoints and data models
    pub keywords: KeywordSet,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            spec_timeout: DEFAULT_SPEC_TIMEOUT,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            render_api_key: None,
            render_endpoint: None,
            sufficiency_threshold: DEFAULT_SUFFICIENCY_THRESHOLD,
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
            keywords: KeywordSet::default(),
        }
    }
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("user_agent", &self.user_agent)
            .field("page_timeout", &self.page_timeout)
            .field("spec_timeout", &self.spec_timeout)
            .field("render_timeout", &self.render_timeout)
            .field("render_api_key", &self.render_api_key.as_ref().map(|_| "<redacted>"))
            .field("render_endpoint", &self.render_endpoint)
            .field("sufficiency_threshold", &self.sufficiency_threshold)
            .field("min_content_chars", &self.min_content_chars)
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}

impl ExtractOptions {
    /// Rendering key, if configured and non-blank
    fn render_key(&self) -> Option<&str> {
        self.render_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Prepend `https://` to a URL that carries no scheme
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Check that `url` is a non-empty http(s) URL
pub fn validate_url(url: &str) -> Result<Url, ExtractError> {
    if url.trim().is_empty() {
        return Err(ExtractError::MissingUrl);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ExtractError::InvalidUrlScheme);
    }
    Url::parse(url).map_err(|_| ExtractError::InvalidUrlScheme)
}

/// Fetch-once, try-in-order extraction pipeline
pub struct Extractor {
    options: ExtractOptions,
    fetcher: Arc<dyn PageFetcher>,
    chain: StrategyChain,
}

impl Extractor {
    /// Create an extractor with the reqwest-backed fetcher and renderer
    pub fn new(options: ExtractOptions) -> Result<Self, ExtractError> {
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(user_agent));

        let renderer = options.render_key().map(|key| {
            let service = HttpRenderService::new(key);
            let service = match &options.render_endpoint {
                Some(endpoint) => service.with_endpoint(endpoint.clone()),
                None => service,
            };
            Arc::new(service) as Arc<dyn Renderer>
        });

        Self::with_collaborators(options, fetcher, renderer)
    }

    /// Create an extractor around caller-provided collaborators
    ///
    /// The render strategy is registered only when `renderer` is given.
    pub fn with_collaborators(
        options: ExtractOptions,
        fetcher: Arc<dyn PageFetcher>,
        renderer: Option<Arc<dyn Renderer>>,
    ) -> Result<Self, ExtractError> {
        let keywords = options.keywords.compile()?;

        let mut chain = StrategyChain::new(options.sufficiency_threshold);
        chain.register(Box::new(PlainTextStrategy::new(options.max_chars)));
        chain.register(Box::new(OpenApiStrategy::new(
            fetcher.clone(),
            keywords,
            options.spec_timeout,
            options.max_chars,
        )));
        chain.register(Box::new(EmbeddedStateStrategy::new(options.max_chars)));
        if let Some(renderer) = renderer {
            chain.register(Box::new(RenderStrategy::new(
                renderer,
                options.render_timeout,
                options.max_chars,
            )));
        }

        Ok(Self {
            options,
            fetcher,
            chain,
        })
    }

    /// Options this extractor was built with
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Names of the registered strategies, in the order they run
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Extract text from `url`
    ///
    /// Fails only when the page itself cannot be fetched (timeout,
    /// transport error, non-2xx status). A page that yields little text is
    /// returned as is; see [`extract_checked`](Self::extract_checked).
    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, ExtractError> {
        self.extract_with_status(url, |_| {}).await
    }

    /// Like [`extract`](Self::extract), failing with
    /// [`ExtractError::InsufficientContent`] below the minimum content size
    pub async fn extract_checked(&self, url: &str) -> Result<ExtractionResult, ExtractError> {
        let result = self.extract(url).await?;
        self.ensure_sufficient(result)
    }

    /// Reject a result shorter than `min_content_chars`
    pub fn ensure_sufficient(&self, result: ExtractionResult) -> Result<ExtractionResult, ExtractError> {
        let chars = result.char_count();
        if chars < self.options.min_content_chars {
            return Err(ExtractError::InsufficientContent { chars });
        }
        Ok(result)
    }

    /// Extract with progress updates
    ///
    /// Phases: `fetch`, then one per strategy that runs (named after the
    /// strategy), then `complete`.
    pub async fn extract_with_status<F>(
        &self,
        url: &str,
        mut status_callback: F,
    ) -> Result<ExtractionResult, ExtractError>
    where
        F: FnMut(ToolStatus),
    {
        let parsed = validate_url(url)?;

        status_callback(
            ToolStatus::new("fetch")
                .with_message(format!("Fetching {}", url))
                .with_percent(0.0),
        );

        let page = self
            .fetcher
            .fetch(&PageRequest::html(url, self.options.page_timeout))
            .await?
            .error_for_status()?;
        debug!(url = %url, final_url = %page.final_url, bytes = page.body.len(), "Fetched page");

        let page_url = Url::parse(&page.final_url).unwrap_or(parsed);
        let context = PageContext {
            url: &page_url,
            html: &page.body,
        };

        let total = self.chain.len().max(1) as f32;
        let mut step = 0.0_f32;
        let outcome = self
            .chain
            .run_with_progress(&context, |name| {
                status_callback(ToolStatus::new(name).with_percent(10.0 + 80.0 * step / total));
                step += 1.0;
            })
            .await;

        let text = normalize_text(&outcome.text, self.options.max_chars);
        info!(
            url = %url,
            chars = char_len(&text),
            strategy = outcome.strategy.unwrap_or("none"),
            used_rendering = outcome.used_rendering,
            "Extraction finished"
        );

        status_callback(ToolStatus::new("complete").with_percent(100.0));

        Ok(ExtractionResult {
            text,
            used_rendering: outcome.used_rendering,
            strategy: outcome.strategy.map(str::to_string),
        })
    }
}

/// Extract text from a URL with default options
///
/// For custom options, use [`extract_with_options`].
pub async fn extract(req: ExtractRequest) -> Result<ExtractionResult, ExtractError> {
    extract_with_options(req, ExtractOptions::default()).await
}

/// Extract text from a URL with custom options
///
/// A URL without a scheme gets `https://`. The result is checked against
/// `min_content_chars`.
pub async fn extract_with_options(
    req: ExtractRequest,
    options: ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    let url = normalize_url(&req.url);
    if url.is_empty() {
        return Err(ExtractError::MissingUrl);
    }
    Extractor::new(options)?.extract_checked(&url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchedPage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves one fixed HTML body and records requested URLs
    struct StubFetcher {
        html: String,
        status: u16,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(html: &str) -> Arc<Self> {
            Arc::new(Self {
                html: html.to_string(),
                status: 200,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, ExtractError> {
            self.requested.lock().unwrap().push(request.url.clone());
            Ok(FetchedPage {
                url: request.url.clone(),
                final_url: request.url.clone(),
                status: self.status,
                content_type: Some("text/html".into()),
                body: self.html.clone(),
            })
        }
    }

    #[test]
    fn test_options_default() {
        let options = ExtractOptions::default();
        assert!(options.user_agent.is_none());
        assert!(options.render_api_key.is_none());
        assert_eq!(options.page_timeout, Duration::from_secs(15));
        assert_eq!(options.spec_timeout, Duration::from_secs(20));
        assert_eq!(options.render_timeout, Duration::from_secs(30));
        assert_eq!(options.sufficiency_threshold, 200);
        assert_eq!(options.min_content_chars, 50);
        assert_eq!(options.max_chars, 12_000);
    }

    #[test]
    fn test_options_debug_redacts_key() {
        let options = ExtractOptions {
            render_api_key: Some("sb-secret".into()),
            ..Default::default()
        };
        let printed = format!("{:?}", options);
        assert!(!printed.contains("sb-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("docs.example.com/a"), "https://docs.example.com/a");
        assert_eq!(normalize_url(" https://x.com "), "https://x.com");
        assert_eq!(normalize_url("http://x.com"), "http://x.com");
        assert_eq!(normalize_url("ftp://x.com"), "ftp://x.com");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn test_validate_url() {
        assert!(matches!(validate_url(""), Err(ExtractError::MissingUrl)));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(ExtractError::InvalidUrlScheme)
        ));
        assert!(matches!(
            validate_url("https://"),
            Err(ExtractError::InvalidUrlScheme)
        ));
        assert!(validate_url("https://example.com/docs").is_ok());
    }

    #[test]
    fn test_render_strategy_requires_key() {
        let extractor = Extractor::new(ExtractOptions::default()).unwrap();
        assert_eq!(
            extractor.strategy_names(),
            vec!["plain_text", "openapi", "embedded_state"]
        );

        let blank = Extractor::new(ExtractOptions {
            render_api_key: Some("  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(blank.strategy_names().len(), 3);

        let keyed = Extractor::new(ExtractOptions {
            render_api_key: Some("key".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            keyed.strategy_names(),
            vec!["plain_text", "openapi", "embedded_state", "render"]
        );
    }

    #[test]
    fn test_invalid_keywords() {
        let options = ExtractOptions {
            keywords: KeywordSet::new(vec!["(unclosed".into()], vec![]),
            ..Default::default()
        };
        assert!(matches!(
            Extractor::new(options),
            Err(ExtractError::InvalidKeywords(_))
        ));
    }

    #[tokio::test]
    async fn test_rich_page_stops_after_plain_text() {
        let body = "Billing duties to a third party account is configured per shipment. ".repeat(5);
        let fetcher = StubFetcher::new(&format!(
            r#"<html><body><main><p>{}</p></main><redoc spec-url="/openapi.json"></redoc></body></html>"#,
            body
        ));
        let extractor =
            Extractor::with_collaborators(ExtractOptions::default(), fetcher.clone(), None).unwrap();

        let mut phases = Vec::new();
        let result = extractor
            .extract_with_status("https://example.com/docs", |s| phases.push(s.phase))
            .await
            .unwrap();

        assert_eq!(result.text, body.trim());
        assert!(!result.used_rendering);
        assert_eq!(result.strategy.as_deref(), Some("plain_text"));
        assert_eq!(phases, vec!["fetch", "plain_text", "complete"]);
        assert_eq!(
            *fetcher.requested.lock().unwrap(),
            vec!["https://example.com/docs".to_string()]
        );
    }

    #[tokio::test]
    async fn test_extract_checked_rejects_thin_page() {
        let fetcher = StubFetcher::new("<html><body><main>Loading…</main></body></html>");
        let extractor =
            Extractor::with_collaborators(ExtractOptions::default(), fetcher, None).unwrap();

        let result = extractor.extract("https://example.com").await.unwrap();
        assert_eq!(result.text, "Loading…");
        assert!(!result.used_rendering);

        match extractor.extract_checked("https://example.com").await {
            Err(ExtractError::InsufficientContent { chars }) => assert_eq!(chars, 8),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_surfaces() {
        let fetcher = Arc::new(StubFetcher {
            html: "<main>gone</main>".into(),
            status: 404,
            requested: Mutex::new(Vec::new()),
        });
        let extractor =
            Extractor::with_collaborators(ExtractOptions::default(), fetcher, None).unwrap();
        assert!(matches!(
            extractor.extract("https://example.com/missing").await,
            Err(ExtractError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_empty_url() {
        let result = extract(ExtractRequest::new("")).await;
        assert!(matches!(result, Err(ExtractError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_extract_invalid_scheme() {
        let result = extract(ExtractRequest::new("ftp://example.com")).await;
        assert!(matches!(result, Err(ExtractError::InvalidUrlScheme)));
    }
}
