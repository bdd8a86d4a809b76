//! API documentation portals (ReDoc, Swagger UI, OpenAPI links)
//!
//! Portals like these ship an almost empty HTML shell and load the real
//! content from a specification document. This strategy finds that
//! document, fetches it and summarizes the relevant part.

use super::{ExtractionStrategy, PageContext};
use crate::apispec::ApiSpecification;
use crate::error::ExtractError;
use crate::http::{PageFetcher, PageRequest};
use crate::keywords::KeywordMatcher;
use crate::spec_summary::summarize_spec;
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;
use url::Url;

static SPEC_URL_ATTR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[spec-url]").unwrap());
static SCRIPT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static OPENAPI_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="openapi"][href]"#).unwrap());

static SWAGGER_UI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SwaggerUI(?:Bundle)?\s*\(").unwrap());
static URL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\burl\s*:\s*["'`]([^"'`]+)["'`]"#).unwrap());
static SPEC_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["'`]([^"'`\s]*(?:swagger|openapi|api-docs)[^"'`\s]*\.(?:json|ya?ml))["'`]"#)
        .unwrap()
});

/// Find the specification URL referenced by an API portal page
///
/// Checked in order: a `spec-url` attribute (ReDoc), a Swagger UI bootstrap
/// script with a `url:` literal, any inline script mentioning a
/// swagger/openapi/api-docs `.json`/`.yaml`/`.yml` path, and finally
/// `<link rel="openapi">`. The returned value is unresolved.
pub fn detect_spec_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(url) = document
        .select(&SPEC_URL_ATTR)
        .filter_map(|el| el.value().attr("spec-url"))
        .map(str::trim)
        .find(|url| !url.is_empty())
    {
        return Some(url.to_string());
    }

    let scripts: Vec<String> = document
        .select(&SCRIPT)
        .map(|el| el.text().collect::<String>())
        .filter(|body| !body.trim().is_empty())
        .collect();

    let swagger_ui = scripts.iter().find_map(|body| {
        SWAGGER_UI.find(body)?;
        URL_LITERAL.captures(body).map(|c| c[1].to_string())
    });
    if swagger_ui.is_some() {
        return swagger_ui;
    }

    if let Some(path) = scripts
        .iter()
        .find_map(|body| SPEC_PATH.captures(body).map(|c| c[1].to_string()))
    {
        return Some(path);
    }

    document
        .select(&OPENAPI_LINK)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

/// Resolve a detected specification URL against the page URL
///
/// Absolute URLs are kept, `//host/x` takes the page scheme, `/x` is joined
/// to the page origin and anything else is appended to the page URL
/// (`{page}/{x}`), query and fragment dropped.
pub fn resolve_spec_url(page: &Url, spec: &str) -> String {
    let spec = spec.trim();
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return spec.to_string();
    }
    if spec.starts_with("//") {
        return format!("{}:{}", page.scheme(), spec);
    }
    if spec.starts_with('/') {
        return format!("{}{}", page.origin().ascii_serialization(), spec);
    }

    let mut base = page.clone();
    base.set_query(None);
    base.set_fragment(None);
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        spec.trim_start_matches("./")
    )
}

/// Fetch and summarize the page's OpenAPI/Swagger specification
pub struct OpenApiStrategy {
    fetcher: Arc<dyn PageFetcher>,
    keywords: KeywordMatcher,
    timeout: Duration,
    max_chars: usize,
}

impl OpenApiStrategy {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        keywords: KeywordMatcher,
        timeout: Duration,
        max_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            keywords,
            timeout,
            max_chars,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for OpenApiStrategy {
    fn name(&self) -> &'static str {
        "openapi"
    }

    async fn attempt(&self, page: &PageContext<'_>) -> Result<Option<String>, ExtractError> {
        let Some(detected) = detect_spec_url(page.html) else {
            return Ok(None);
        };
        let spec_url = resolve_spec_url(page.url, &detected);
        debug!(url = %page.url, spec_url = %spec_url, "Found API specification reference");

        let fetched = self
            .fetcher
            .fetch(&PageRequest::document(&spec_url, self.timeout))
            .await?
            .error_for_status()?;

        let spec = ApiSpecification::parse(&fetched.body)?;
        debug!(
            spec_url = %spec_url,
            endpoints = spec.endpoints.len(),
            schemas = spec.schemas.len(),
            "Parsed API specification"
        );

        let summary = summarize_spec(&spec, &self.keywords, self.max_chars);
        Ok((!summary.is_empty()).then_some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://docs.example.com/reference/api?tab=1#top").unwrap()
    }

    #[test]
    fn test_detect_redoc() {
        let html = r#"<html><body><redoc spec-url="/api/openapi.json"></redoc></body></html>"#;
        assert_eq!(detect_spec_url(html).as_deref(), Some("/api/openapi.json"));
    }

    #[test]
    fn test_detect_swagger_ui() {
        let html = r#"<script>
            window.onload = function() {
              const ui = SwaggerUIBundle({
                url: "https://petstore.example.com/v2/spec.json",
                dom_id: '#swagger-ui'
              });
            };
        </script>"#;
        assert_eq!(
            detect_spec_url(html).as_deref(),
            Some("https://petstore.example.com/v2/spec.json")
        );
    }

    #[test]
    fn test_detect_script_reference() {
        let html = r#"<script>loadDocs('static/openapi-v3.yaml');</script>"#;
        assert_eq!(detect_spec_url(html).as_deref(), Some("static/openapi-v3.yaml"));

        let html = r#"<script>fetch("/v1/api-docs.json").then(render)</script>"#;
        assert_eq!(detect_spec_url(html).as_deref(), Some("/v1/api-docs.json"));
    }

    #[test]
    fn test_detect_link() {
        let html = r#"<head><link rel="openapi" href="https://api.example.com/openapi.yml"></head>"#;
        assert_eq!(
            detect_spec_url(html).as_deref(),
            Some("https://api.example.com/openapi.yml")
        );
    }

    #[test]
    fn test_detection_order() {
        let html = r#"<head><link rel="openapi" href="/from-link.json"></head>
            <body><redoc spec-url="/from-redoc.json"></redoc>
            <script>SwaggerUIBundle({url: "/from-swagger.json"})</script></body>"#;
        assert_eq!(detect_spec_url(html).as_deref(), Some("/from-redoc.json"));
    }

    #[test]
    fn test_detect_nothing() {
        let html = r#"<html><body><p>Plain docs</p><script>var config = {url: "/x"};</script></body></html>"#;
        assert_eq!(detect_spec_url(html), None);
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_spec_url(&page(), "https://other.example.com/spec.json"),
            "https://other.example.com/spec.json"
        );
        assert_eq!(
            resolve_spec_url(&page(), "//cdn.example.com/spec.json"),
            "https://cdn.example.com/spec.json"
        );
    }

    #[test]
    fn test_resolve_origin_relative() {
        assert_eq!(
            resolve_spec_url(&page(), "/api/openapi.json"),
            "https://docs.example.com/api/openapi.json"
        );
        let with_port = Url::parse("http://127.0.0.1:8080/docs").unwrap();
        assert_eq!(
            resolve_spec_url(&with_port, "/openapi.json"),
            "http://127.0.0.1:8080/openapi.json"
        );
    }

    #[test]
    fn test_resolve_page_relative() {
        assert_eq!(
            resolve_spec_url(&page(), "openapi.json"),
            "https://docs.example.com/reference/api/openapi.json"
        );
        let trailing = Url::parse("https://docs.example.com/reference/").unwrap();
        assert_eq!(
            resolve_spec_url(&trailing, "./spec.yaml"),
            "https://docs.example.com/reference/spec.yaml"
        );
    }
}
