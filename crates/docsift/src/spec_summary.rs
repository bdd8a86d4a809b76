//! Render the topically relevant part of an API specification as text

use crate::apispec::{ApiSpecification, Endpoint};
use crate::convert::{normalize_text, squash_whitespace, take_chars};
use crate::keywords::KeywordMatcher;
use crate::schema::describe_schema;
use serde_json::{Map, Value};

/// Heading that introduces keyword-matched endpoints
pub const RELEVANT_ENDPOINTS_HEADING: &str = "## Relevant API Endpoints";
/// Heading used when no endpoint matched and all are listed instead
pub const ALL_ENDPOINTS_HEADING: &str = "## API Endpoints";
/// Heading that introduces keyword-matched schemas
pub const RELEVANT_MODELS_HEADING: &str = "## Relevant Data Models";

const MAX_RELEVANT_ENDPOINTS: usize = 30;
const MAX_LISTED_ENDPOINTS: usize = 50;
const MAX_RELEVANT_SCHEMAS: usize = 20;
const MAX_LISTED_PROPERTIES: usize = 20;
const MAX_ENUM_VALUES: usize = 10;
const MAX_ENDPOINT_DESCRIPTION: usize = 300;
const MAX_PROPERTY_DESCRIPTION: usize = 200;
const MAX_API_DESCRIPTION: usize = 500;

/// Summarize `spec`, keeping endpoints and schemas that `keywords` matches
///
/// Output is bounded to `max_chars` characters (plus truncation marker).
pub fn summarize_spec(spec: &ApiSpecification, keywords: &KeywordMatcher, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    let title = if spec.info.title.is_empty() {
        "Untitled API"
    } else {
        spec.info.title.as_str()
    };
    if spec.info.version.is_empty() {
        lines.push(format!("# API Specification: {}", title));
    } else {
        lines.push(format!("# API Specification: {} (v{})", title, spec.info.version));
    }
    let description = squash_whitespace(&spec.info.description);
    if !description.is_empty() {
        lines.push(take_chars(&description, MAX_API_DESCRIPTION).to_string());
    }
    lines.push(String::new());

    let relevant: Vec<&Endpoint> = spec
        .endpoints
        .iter()
        .filter(|e| is_relevant_endpoint(e, keywords))
        .collect();

    if relevant.is_empty() {
        if !spec.endpoints.is_empty() {
            lines.push(ALL_ENDPOINTS_HEADING.to_string());
            for endpoint in spec.endpoints.iter().take(MAX_LISTED_ENDPOINTS) {
                lines.push(endpoint_line(endpoint));
            }
            lines.push(String::new());
        }
    } else {
        lines.push(RELEVANT_ENDPOINTS_HEADING.to_string());
        for endpoint in relevant.into_iter().take(MAX_RELEVANT_ENDPOINTS) {
            render_endpoint(endpoint, &spec.schemas, &mut lines);
        }
    }

    let relevant_schemas: Vec<(&String, &Value)> = spec
        .schemas
        .iter()
        .filter(|(name, schema)| is_relevant_schema(name, schema, keywords))
        .take(MAX_RELEVANT_SCHEMAS)
        .collect();

    if !relevant_schemas.is_empty() {
        lines.push(RELEVANT_MODELS_HEADING.to_string());
        for (name, schema) in relevant_schemas {
            render_schema(name, schema, keywords, &mut lines);
        }
    }

    normalize_text(&lines.join("\n"), max_chars)
}

/// An endpoint is relevant if its path or any of its text matches
pub fn is_relevant_endpoint(endpoint: &Endpoint, keywords: &KeywordMatcher) -> bool {
    keywords.is_match(&endpoint.path) || keywords.is_match(&endpoint.combined_text())
}

/// A schema is relevant if its name or serialized body matches
pub fn is_relevant_schema(name: &str, schema: &Value, keywords: &KeywordMatcher) -> bool {
    keywords.is_match(name) || keywords.is_match(&schema.to_string())
}

fn endpoint_line(endpoint: &Endpoint) -> String {
    if endpoint.summary.is_empty() {
        format!("- {} {}", endpoint.method, endpoint.path)
    } else {
        format!(
            "- {} {}: {}",
            endpoint.method,
            endpoint.path,
            squash_whitespace(&endpoint.summary)
        )
    }
}

fn render_endpoint(endpoint: &Endpoint, schemas: &Map<String, Value>, lines: &mut Vec<String>) {
    lines.push(format!("### {} {}", endpoint.method, endpoint.path));
    if !endpoint.summary.is_empty() {
        lines.push(format!("Summary: {}", squash_whitespace(&endpoint.summary)));
    }
    let description = squash_whitespace(&endpoint.description);
    if !description.is_empty() {
        lines.push(format!(
            "Description: {}",
            take_chars(&description, MAX_ENDPOINT_DESCRIPTION).trim_end()
        ));
    }
    if !endpoint.tags.is_empty() {
        lines.push(format!("Tags: {}", endpoint.tags.join(", ")));
    }
    if let Some(schema) = &endpoint.request_schema {
        lines.push(format!("Request body: {}", describe_schema(schema, schemas)));
    }
    for (code, schema) in &endpoint.success_responses {
        lines.push(format!("Response {}: {}", code, describe_schema(schema, schemas)));
    }
    lines.push(String::new());
}

fn render_schema(name: &str, schema: &Value, keywords: &KeywordMatcher, lines: &mut Vec<String>) {
    lines.push(format!("### {}", name));

    let description = schema
        .get("description")
        .and_then(Value::as_str)
        .map(squash_whitespace)
        .unwrap_or_default();
    if !description.is_empty() {
        lines.push(take_chars(&description, MAX_PROPERTY_DESCRIPTION).trim_end().to_string());
    }

    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        lines.push(String::new());
        return;
    };

    for (prop_name, prop) in props {
        if keywords.is_match(prop_name) || keywords.is_match(&prop.to_string()) {
            lines.push(property_line(prop_name, prop));
        }
    }

    let names: Vec<&str> = props
        .keys()
        .take(MAX_LISTED_PROPERTIES)
        .map(String::as_str)
        .collect();
    if !names.is_empty() {
        if props.len() > MAX_LISTED_PROPERTIES {
            lines.push(format!(
                "Properties (first {} of {}): {}",
                MAX_LISTED_PROPERTIES,
                props.len(),
                names.join(", ")
            ));
        } else {
            lines.push(format!("Properties: {}", names.join(", ")));
        }
    }
    lines.push(String::new());
}

fn property_line(name: &str, prop: &Value) -> String {
    let kind = match prop.get("type") {
        Some(Value::String(t)) => t.clone(),
        _ => prop
            .get("$ref")
            .and_then(Value::as_str)
            .map(|r| crate::schema::ref_name(r).to_string())
            .unwrap_or_else(|| "any".to_string()),
    };

    let mut line = format!("- {} ({})", name, kind);

    let description = prop
        .get("description")
        .and_then(Value::as_str)
        .map(squash_whitespace)
        .unwrap_or_default();
    if !description.is_empty() {
        line.push_str(": ");
        line.push_str(take_chars(&description, MAX_PROPERTY_DESCRIPTION));
    }

    if let Some(values) = prop.get("enum").and_then(Value::as_array) {
        let rendered: Vec<String> = values
            .iter()
            .take(MAX_ENUM_VALUES)
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if !rendered.is_empty() {
            line.push_str(&format!(" [values: {}]", rendered.join(", ")));
        }
    }

    line
}
