//! Tolerant parsing of the summarizer's structured reply
//!
//! Models are asked for a bare JSON object but often wrap it in a code fence
//! or surround it with prose.

use crate::error::ExtractError;
use crate::types::GuideOutcome;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:[jJ][sS][oO][nN])?[ \t]*\r?\n?(.*?)```").unwrap());

/// Parse a [`GuideOutcome`] out of a raw reply
///
/// Tries, in order: the contents of the first fenced block (or the whole
/// reply when unfenced) as JSON, then the span from the first `{` to the
/// last `}`. Fails with [`ExtractError::MalformedReply`] when neither parses.
pub fn parse_outcome(raw: &str) -> Result<GuideOutcome, ExtractError> {
    let body = match FENCED_BLOCK.captures(raw) {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()),
        None => raw,
    };

    for candidate in [body, raw] {
        let candidate = candidate.trim();
        if let Ok(outcome) = serde_json::from_str::<GuideOutcome>(candidate) {
            return Ok(outcome.normalized());
        }
        if let Some(span) = object_span(candidate) {
            if let Ok(outcome) = serde_json::from_str::<GuideOutcome>(span) {
                return Ok(outcome.normalized());
            }
        }
    }

    Err(ExtractError::MalformedReply(preview(raw)))
}

/// Greedy first-`{` to last-`}` slice
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn preview(raw: &str) -> String {
    const PREVIEW_CHARS: usize = 80;
    let trimmed = raw.trim();
    let mut out: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    if out.is_empty() {
        out.push_str("empty reply");
    }
    out
}

/// A reply after interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretedReply {
    pub outcome: GuideOutcome,
    /// False when the reply was not JSON and is passed through as the guide
    pub structured: bool,
}

/// Parse a reply, falling back to the raw text as a supported guide
pub fn interpret_reply(raw: &str) -> InterpretedReply {
    match parse_outcome(raw) {
        Ok(outcome) => InterpretedReply {
            outcome,
            structured: true,
        },
        Err(e) => {
            warn!(error = %e, "Summarizer reply is not structured, passing raw text through");
            InterpretedReply {
                outcome: GuideOutcome {
                    supported: true,
                    platform: String::new(),
                    guide: Some(raw.trim().to_string()),
                    missing: None,
                },
                structured: false,
            }
        }
    }
}
