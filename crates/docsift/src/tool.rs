//! Tool builder and contract for docsift

use crate::client::{normalize_url, ExtractOptions, Extractor};
use crate::error::ExtractError;
use crate::keywords::KeywordSet;
use crate::types::{ExtractRequest, ExtractionResult};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status update during tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    /// Current phase ("fetch", a strategy name, "complete")
    pub phase: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl ToolStatus {
    /// Create a new status with phase
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set completion percentage
    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Builder for configuring the docsift tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    options: ExtractOptions,
}

impl ToolBuilder {
    /// Create a new tool builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Enable the JS-rendering fallback with this service key
    pub fn render_api_key(mut self, key: impl Into<String>) -> Self {
        self.options.render_api_key = Some(key.into());
        self
    }

    /// Override the rendering service endpoint
    pub fn render_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options.render_endpoint = Some(endpoint.into());
        self
    }

    /// Deadline for the primary page fetch
    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.options.page_timeout = timeout;
        self
    }

    /// Minimum characters a result must have
    pub fn min_content_chars(mut self, chars: usize) -> Self {
        self.options.min_content_chars = chars;
        self
    }

    /// Bound on returned text
    pub fn max_chars(mut self, chars: usize) -> Self {
        self.options.max_chars = chars;
        self
    }

    /// Replace the relevance vocabulary
    pub fn keywords(mut self, keywords: KeywordSet) -> Self {
        self.options.keywords = keywords;
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            options: self.options,
        }
    }
}

/// Configured docsift tool
#[derive(Debug, Clone, Default)]
pub struct Tool {
    options: ExtractOptions,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Options the tool runs with
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(ExtractRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(ExtractionResult);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Execute the tool with the given request
    pub async fn execute(&self, req: ExtractRequest) -> Result<ExtractionResult, ExtractError> {
        self.execute_with_status(req, |_| {}).await
    }

    /// Execute the tool with status updates
    pub async fn execute_with_status<F>(
        &self,
        req: ExtractRequest,
        mut status_callback: F,
    ) -> Result<ExtractionResult, ExtractError>
    where
        F: FnMut(ToolStatus),
    {
        status_callback(ToolStatus::new("validate").with_percent(0.0));

        let url = normalize_url(&req.url);
        let extractor = Extractor::new(self.options.clone())?;
        let result = extractor.extract_with_status(&url, status_callback).await?;
        extractor.ensure_sufficient(result)
    }
}
