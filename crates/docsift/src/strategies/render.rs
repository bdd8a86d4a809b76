//! Last resort: have an external service execute the page's JavaScript

use super::plain_text::extract_visible_text;
use super::{Adoption, ExtractionStrategy, PageContext};
use crate::error::ExtractError;
use crate::render::{RenderOptions, Renderer};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Render the page remotely and extract visible text from the result
///
/// Its yield replaces whatever static extraction produced.
pub struct RenderStrategy {
    renderer: Arc<dyn Renderer>,
    timeout: Duration,
    max_chars: usize,
}

impl RenderStrategy {
    pub fn new(renderer: Arc<dyn Renderer>, timeout: Duration, max_chars: usize) -> Self {
        Self {
            renderer,
            timeout,
            max_chars,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for RenderStrategy {
    fn name(&self) -> &'static str {
        "render"
    }

    fn adoption(&self) -> Adoption {
        Adoption::Replace
    }

    fn renders(&self) -> bool {
        true
    }

    async fn attempt(&self, page: &PageContext<'_>) -> Result<Option<String>, ExtractError> {
        let options = RenderOptions {
            render_js: true,
            timeout: self.timeout,
        };
        let rendered = self.renderer.render(page.url.as_str(), &options).await?;
        debug!(url = %page.url, bytes = rendered.html.len(), "Rendered page received");
        Ok(Some(extract_visible_text(&rendered.html, self.max_chars)))
    }
}
