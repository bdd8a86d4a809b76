//! Error types for docsift

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while extracting or summarizing a page
#[derive(Debug, Error)]
pub enum ExtractError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request did not complete within its deadline
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Response body exceeded the read limit
    #[error("Response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Rendering service answered with a non-200 status
    #[error("Render service returned HTTP {0}")]
    RenderStatus(u16),

    /// A fetched document could not be understood
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Every strategy produced too little text
    #[error(
        "The page returned very little text content ({chars} characters). \
         It may require JavaScript to render. Try a direct documentation link."
    )]
    InsufficientContent { chars: usize },

    /// Keyword vocabulary failed to compile
    #[error("Invalid keyword pattern")]
    InvalidKeywords(#[from] regex::Error),

    /// Required credential or setting is absent
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    /// Summarization service failed
    #[error("AI service error: {0}")]
    UpstreamService(String),

    /// Summarizer reply did not contain a JSON object
    #[error("Malformed structured reply: {0}")]
    MalformedReply(String),
}

impl ExtractError {
    /// Create an error from a reqwest error
    ///
    /// `timeout` is the deadline that was configured for the request and is
    /// reported back when reqwest classifies the failure as a timeout.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout(timeout)
        } else if err.is_connect() {
            ExtractError::ConnectError(err)
        } else {
            ExtractError::RequestError(err.to_string())
        }
    }

    /// True for [`ExtractError::Timeout`]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExtractError::Timeout(_))
    }

    /// True for failures of the transport itself (connection, status, body)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExtractError::Timeout(_)
                | ExtractError::ConnectError(_)
                | ExtractError::HttpStatus { .. }
                | ExtractError::BodyTooLarge { .. }
                | ExtractError::RequestError(_)
                | ExtractError::ClientBuildError(_)
        )
    }
}
