//! docsift - documentation text extraction for LLM summarization
//!
//! This crate fetches an arbitrary documentation page and extracts enough
//! text from it for a summarizer to work with, even when the page is an API
//! portal shell, a client-rendered single-page app, or only renders after
//! JavaScript runs.
//!
//! ## Strategy chain
//!
//! The page is fetched once and handed to an ordered list of
//! [`ExtractionStrategy`] implementations. The chain stops as soon as the
//! text collected so far is sufficient:
//!
//! 1. [`PlainTextStrategy`] - visible text with boilerplate removed
//! 2. [`OpenApiStrategy`] - ReDoc/Swagger UI/OpenAPI specification summary
//! 3. [`EmbeddedStateStrategy`] - Next.js/Nuxt/Redux/Apollo/JSON-LD payloads
//! 4. [`RenderStrategy`] - external JS rendering (only with a service key)
//!
//! ## Guides
//!
//! [`GuideService`] feeds extracted text to a [`Summarizer`] and interprets
//! its reply as a [`GuideOutcome`].

mod apispec;
pub mod client;
mod convert;
mod error;
mod guide;
pub mod http;
mod keywords;
pub mod render;
mod reply;
mod schema;
mod spec_summary;
pub mod strategies;
mod structured;
mod summarize;
mod tool;
mod types;

pub use apispec::{ApiInfo, ApiSpecification, Endpoint};
pub use client::{extract, extract_with_options, normalize_url, ExtractOptions, Extractor};
pub use convert::{collapse_newlines, normalize_text, truncate_with_marker, TRUNCATION_MARKER};
pub use error::ExtractError;
pub use guide::GuideService;
pub use http::{FetchedPage, HttpPageFetcher, PageFetcher, PageRequest};
pub use keywords::{KeywordMatcher, KeywordSet};
pub use render::{HttpRenderService, RenderOptions, RenderedPage, Renderer};
pub use reply::{interpret_reply, parse_outcome, InterpretedReply};
pub use schema::describe_schema;
pub use spec_summary::summarize_spec;
pub use strategies::{
    extract_visible_text, Adoption, EmbeddedStateStrategy, ExtractionStrategy, OpenApiStrategy,
    PageContext, PlainTextStrategy, RenderStrategy, StrategyChain,
};
pub use structured::{extract_text, TextCollector};
pub use summarize::{AnthropicSummarizer, Summarizer};
pub use tool::{Tool, ToolBuilder, ToolStatus};
pub use types::{ExtractRequest, ExtractionResult, GuideOutcome, GuideReport};

/// Default User-Agent string (a desktop browser; many documentation sites
/// serve bots a reduced page)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Extracts readable documentation text from a web page.

- Visible page text with navigation and scripts removed
- Summarizes OpenAPI/Swagger specs behind API documentation portals
- Reads content embedded by client-side frameworks (Next.js, Nuxt, JSON-LD)
- Optional JavaScript rendering fallback"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# docsift Tool

Extracts readable documentation text from a single web page, trying
progressively more expensive strategies until enough text is found.

## Capabilities
- Plain text extraction (prefers main/article content, drops nav/header/footer/scripts)
- OpenAPI/Swagger/ReDoc detection: fetches the spec and lists the endpoints
  and data models relevant to billing, duties, taxes and shipping
- Embedded application state (__NEXT_DATA__, window.__NUXT__, Redux/Apollo state, JSON-LD)
- JavaScript rendering through an external service (when configured)

## Input Parameters
- `url` (required): The page to extract (http:// or https://; a bare host gets https://)

## Output Fields
- `text`: Extracted plain text, at most 12000 characters plus a truncation marker
- `used_rendering`: True if the JavaScript rendering service produced the text
- `strategy`: Which strategy produced the text (plain_text, openapi, embedded_state, render)

## Examples

### Extract a help-center article
```json
{"url": "https://help.example.com/articles/carrier-billing"}
```

### Extract an API reference portal
```json
{"url": "https://developer.example.com/reference"}
```

## Error Handling
- Invalid URLs return an error
- Page fetch timeouts and HTTP error statuses return an error
- Pages with fewer than 50 characters of text return an error suggesting a direct documentation link
"#;
