//! URL in, setup-guide verdict out

use crate::client::{normalize_url, validate_url, Extractor};
use crate::error::ExtractError;
use crate::reply::interpret_reply;
use crate::summarize::Summarizer;
use crate::types::GuideReport;
use std::sync::Arc;
use tracing::info;

/// Extraction followed by summarization
pub struct GuideService {
    extractor: Extractor,
    summarizer: Arc<dyn Summarizer>,
}

impl GuideService {
    pub fn new(extractor: Extractor, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            extractor,
            summarizer,
        }
    }

    /// Produce a guide report for `url`
    ///
    /// A URL without a scheme gets `https://`. Summarizer credentials are
    /// checked before the page is fetched. Pages below the minimum content
    /// size fail with [`ExtractError::InsufficientContent`]. A reply that is
    /// not JSON becomes a supported outcome carrying the raw text, with
    /// `structured = false`.
    pub async fn generate(&self, url: &str) -> Result<GuideReport, ExtractError> {
        let url = normalize_url(url);
        validate_url(&url)?;
        self.summarizer.ensure_configured()?;

        let extraction = self.extractor.extract_checked(&url).await?;
        let raw = self.summarizer.summarize(&url, &extraction.text).await?;
        let reply = interpret_reply(&raw);

        info!(
            url = %url,
            supported = reply.outcome.supported,
            structured = reply.structured,
            "Guide generated"
        );

        Ok(GuideReport {
            outcome: reply.outcome,
            source_url: url,
            used_rendering: extraction.used_rendering,
            structured: reply.structured,
        })
    }
}
