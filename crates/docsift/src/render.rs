//! External JavaScript rendering service
//!
//! docsift never runs JavaScript itself. When static extraction comes up
//! short, the page URL is handed to a rendering service that returns the
//! post-JS HTML.

use crate::error::ExtractError;
use crate::http::read_body;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default rendering endpoint (ScrapingBee-compatible query API)
pub const DEFAULT_RENDER_ENDPOINT: &str = "https://app.scrapingbee.com/api/v1/";

/// Options for a single render call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub render_js: bool,
    pub timeout: Duration,
}

/// HTML returned by the rendering service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub status_code: u16,
    pub html: String,
}

/// Capability to render a URL with JavaScript and return its HTML
///
/// A non-200 status from the service is reported as
/// [`ExtractError::RenderStatus`].
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, options: &RenderOptions)
        -> Result<RenderedPage, ExtractError>;
}

/// reqwest-backed [`Renderer`] for query-string rendering APIs
///
/// Sends `GET {endpoint}?api_key=..&url=..&render_js=true`.
#[derive(Clone)]
pub struct HttpRenderService {
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for HttpRenderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRenderService")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpRenderService {
    /// Create a client for the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_RENDER_ENDPOINT.to_string(),
        }
    }

    /// Override the service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Service URL for rendering `url`
    fn request_url(&self, url: &str, options: &RenderOptions) -> Result<Url, ExtractError> {
        let render_js = if options.render_js { "true" } else { "false" };
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("render_js", render_js),
            ],
        )
        .map_err(|e| ExtractError::RequestError(format!("invalid render endpoint: {}", e)))
    }
}

#[async_trait]
impl Renderer for HttpRenderService {
    async fn render(
        &self,
        url: &str,
        options: &RenderOptions,
    ) -> Result<RenderedPage, ExtractError> {
        let request_url = self.request_url(url, options)?;

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(ExtractError::ClientBuildError)?;

        debug!(url = %url, "Requesting JS render");

        let deadline = tokio::time::Instant::now() + options.timeout;
        let response = client
            .get(request_url)
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(e, options.timeout))?;

        let status_code = response.status().as_u16();
        if status_code != 200 {
            return Err(ExtractError::RenderStatus(status_code));
        }

        let body = read_body(response, deadline, options.timeout).await?;
        Ok(RenderedPage {
            status_code,
            html: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_target() {
        let service = HttpRenderService::new("secret").with_endpoint("https://render.test/api/");
        let options = RenderOptions {
            render_js: true,
            timeout: Duration::from_secs(30),
        };
        let url = service
            .request_url("https://docs.example.com/a?b=c&d=e", &options)
            .unwrap();

        assert_eq!(url.host_str(), Some("render.test"));
        assert_eq!(url.path(), "/api/");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("api_key".to_string(), "secret".to_string()),
                ("url".to_string(), "https://docs.example.com/a?b=c&d=e".to_string()),
                ("render_js".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let service = HttpRenderService::new("k").with_endpoint("not a url");
        let options = RenderOptions {
            render_js: true,
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            service.request_url("https://example.com", &options),
            Err(ExtractError::RequestError(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let service = HttpRenderService::new("super-secret-key");
        let printed = format!("{:?}", service);
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains(DEFAULT_RENDER_ENDPOINT));
    }
}
