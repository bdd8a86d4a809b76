//! Summarization collaborator
//!
//! Turns extracted page text into a setup-guide verdict. The reply is raw
//! text; [`reply`](crate::reply) makes sense of it.

use crate::error::ExtractError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Anthropic Messages API endpoint
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_SUMMARIZER_TIMEOUT: Duration = Duration::from_secs(60);
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Instructions for the assessment
pub const SYSTEM_PROMPT: &str = r##"You write onboarding documentation for Zonos, a company that handles cross-border e-commerce. You will read documentation from a shipping platform and decide whether it can be set up for Zonos.

A platform qualifies only if it offers both of the following:

1. Duties and taxes billed to a third party on their own. Duties and taxes must be chargeable to a separate third-party account (the Zonos DDP account) while shipping charges stay on the shipper's account. A platform that can only send shipping and duties to a third party together does not qualify.

2. Tax identifiers. The user must be able to enter VAT, EORI, IOSS or similar tax ID numbers so that they are printed on commercial invoices and customs paperwork.

Answer with a single JSON object and nothing else.

If either capability is missing:
{"supported": false, "platform": "<platform name>", "missing": "<short explanation of what the platform lacks>"}

If both capabilities are available:
{"supported": true, "platform": "<platform name>", "guide": "<markdown setup guide>"}

Guide format:
- Open with a # heading naming the platform, for example "# ShipHero: Carrier Billing & VAT Setup Guide".
- Organize with ## sections and ### subsections.
- Give numbered steps that are short and actionable.
- Quote field names, menu paths and settings exactly as the documentation shows them.
- End with a "Notes" subsection when there are caveats or limitations."##;

/// Build the user message for a page
pub fn user_prompt(page_url: &str, text: &str) -> String {
    format!(
        "Documentation page from a shipping platform.\n\n\
         URL: {}\n\n\
         --- PAGE CONTENT ---\n{}\n--- END PAGE CONTENT ---\n\n\
         Decide whether the platform supports separate third-party billing of duties and taxes \
         and tax IDs, then answer with the matching JSON object.",
        page_url, text
    )
}

/// Capability to summarize page text into a raw reply
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Fail with [`ExtractError::ConfigurationMissing`] when credentials are absent
    ///
    /// Checked before any network activity.
    fn ensure_configured(&self) -> Result<(), ExtractError>;

    async fn summarize(&self, page_url: &str, text: &str) -> Result<String, ExtractError>;
}

/// [`Summarizer`] backed by the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicSummarizer {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    max_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for AnthropicSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicSummarizer")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AnthropicSummarizer {
    /// Create a summarizer; a missing or blank key is reported on use
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ANTHROPIC_ENDPOINT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_SUMMARIZER_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn key(&self) -> Result<&str, ExtractError> {
        self.api_key
            .as_deref()
            .ok_or(ExtractError::ConfigurationMissing("ANTHROPIC_API_KEY"))
    }
}

#[async_trait]
impl Summarizer for AnthropicSummarizer {
    fn ensure_configured(&self) -> Result<(), ExtractError> {
        self.key().map(|_| ())
    }

    async fn summarize(&self, page_url: &str, text: &str) -> Result<String, ExtractError> {
        let key = self.key()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(key.trim()).map_err(|_| {
                ExtractError::UpstreamService("API key contains invalid characters".to_string())
            })?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(ExtractError::ClientBuildError)?;

        let prompt = user_prompt(page_url, text);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        debug!(model = %self.model, chars = text.chars().count(), "Requesting summary");

        let response = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            warn!(status = status.as_u16(), "Summarizer request rejected");
            return Err(ExtractError::UpstreamService(format!(
                "HTTP {}: {}",
                status.as_u16(),
                api_error_message(&detail)
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| upstream_error(e, self.timeout))?;

        let reply = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if reply.trim().is_empty() {
            return Err(ExtractError::UpstreamService(
                "response contained no text".to_string(),
            ));
        }
        Ok(reply)
    }
}

/// Timeouts keep their own kind; everything else is an upstream failure
fn upstream_error(err: reqwest::Error, timeout: Duration) -> ExtractError {
    if err.is_timeout() {
        ExtractError::Timeout(timeout)
    } else {
        ExtractError::UpstreamService(err.to_string())
    }
}

/// `error.message` of an API error body, or the body itself
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().chars().take(200).collect())
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
