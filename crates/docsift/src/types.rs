//! Core types for docsift

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default explanation used when an unsupported outcome names no reason
pub const DEFAULT_MISSING_REASON: &str = "Required features are not supported by this platform.";

/// Request to extract documentation text from a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractRequest {
    /// The page to extract (required, http:// or https://; a bare host gets https://)
    pub url: String,
}

impl ExtractRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Text produced by one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    /// Plain, whitespace-normalized, length-bounded text
    pub text: String,

    /// True if the external JS-rendering service produced the text
    pub used_rendering: bool,

    /// Name of the strategy whose output was adopted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl ExtractionResult {
    /// Character count of the trimmed text
    pub fn char_count(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// Structured verdict returned by the summarization collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GuideOutcome {
    /// Whether the platform supports every required capability
    ///
    /// A reply that omits it counts as unsupported.
    #[serde(default)]
    pub supported: bool,

    /// Platform name as identified from the page
    #[serde(default)]
    pub platform: String,

    /// Markdown setup guide (present when `supported`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide: Option<String>,

    /// What is missing (present when not `supported`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
}

impl GuideOutcome {
    /// Fill the field required by `supported` when the reply left it out
    pub fn normalized(mut self) -> Self {
        if self.supported {
            self.guide.get_or_insert_with(String::new);
            self.missing = None;
        } else {
            if self.missing.as_deref().map_or(true, |m| m.trim().is_empty()) {
                self.missing = Some(DEFAULT_MISSING_REASON.to_string());
            }
            self.guide = None;
        }
        self
    }
}

/// End-to-end result of the guide flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GuideReport {
    #[serde(flatten)]
    pub outcome: GuideOutcome,

    /// Page the guide was generated from
    pub source_url: String,

    /// True if the page text came from the JS-rendering service
    pub used_rendering: bool,

    /// False when the summarizer reply was not valid JSON and is passed through raw
    pub structured: bool,
}
