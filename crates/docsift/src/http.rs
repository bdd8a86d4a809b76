//! Page fetching
//!
//! The pipeline only needs "GET this URL, give me the body" from the
//! network. [`PageFetcher`] is that seam; [`HttpPageFetcher`] is the reqwest
//! implementation used by default.

use crate::error::ExtractError;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

/// Largest response body read into memory
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Accept header for HTML pages
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept header for API specification documents
pub const ACCEPT_DOCUMENT: &str = "application/json, application/yaml, text/yaml, */*;q=0.8";

/// Connect phase never waits longer than this, even for long deadlines
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops followed when redirects are enabled
const MAX_REDIRECTS: usize = 10;

/// One GET request
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    /// Value of the Accept header
    pub accept: String,
    /// Deadline for the whole exchange, body included
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl PageRequest {
    /// Request for an HTML page, following redirects
    pub fn html(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            accept: ACCEPT_HTML.to_string(),
            timeout,
            follow_redirects: true,
        }
    }

    /// Request for a JSON/YAML document, following redirects
    pub fn document(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            accept: ACCEPT_DOCUMENT.to_string(),
            ..Self::html(url, timeout)
        }
    }
}

/// Response to a [`PageRequest`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy)
    pub body: String,
}

impl FetchedPage {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx page into [`ExtractError::HttpStatus`]
    pub fn error_for_status(self) -> Result<Self, ExtractError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ExtractError::HttpStatus {
                status: self.status,
                url: self.url,
            })
        }
    }
}

/// Capability to GET a URL
///
/// Implementations report transport failures as errors but return non-2xx
/// responses as ordinary pages; callers decide what a status means.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, ExtractError>;
}

/// reqwest-backed [`PageFetcher`]
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    user_agent: String,
}

impl HttpPageFetcher {
    /// Create a fetcher that identifies itself with `user_agent`
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, ExtractError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&request.accept)
                .unwrap_or_else(|_| HeaderValue::from_static("*/*")),
        );

        let policy = if request.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(policy)
            .connect_timeout(request.timeout.min(MAX_CONNECT_TIMEOUT))
            .timeout(request.timeout)
            .build()
            .map_err(ExtractError::ClientBuildError)?;

        let deadline = tokio::time::Instant::now() + request.timeout;
        let response = client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(e, request.timeout))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        debug!(url = %request.url, status, "Fetched page headers");

        let body = read_body(response, deadline, request.timeout).await?;

        Ok(FetchedPage {
            url: request.url.clone(),
            final_url,
            status,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Stream a response body until completion, the deadline, or the size cap
///
/// `timeout` is only used to label a [`ExtractError::Timeout`].
pub(crate) async fn read_body(
    response: reqwest::Response,
    deadline: tokio::time::Instant,
    timeout: Duration,
) -> Result<Bytes, ExtractError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        if body.len() + bytes.len() > MAX_BODY_BYTES {
                            return Err(ExtractError::BodyTooLarge { limit: MAX_BODY_BYTES });
                        }
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => return Err(ExtractError::from_reqwest(e, timeout)),
                    None => return Ok(Bytes::from(body)),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                return Err(ExtractError::Timeout(timeout));
            }
        }
    }
}
