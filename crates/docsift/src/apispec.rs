//! In-memory view of an OpenAPI / Swagger document
//!
//! Parsing is tolerant: the document is first decoded into a generic
//! [`serde_json::Value`] and then projected onto the few fields the summary
//! needs. Missing or oddly-typed fields become empty values instead of
//! failing the whole document.

use crate::error::ExtractError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// HTTP methods that may appear as keys of a path item
const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// `info` block of a specification
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

/// One operation (method + path)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoint {
    /// Upper-case HTTP method
    pub method: String,
    pub path: String,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Request body schema, if any
    pub request_schema: Option<Value>,
    /// `(status code, schema)` for every 2xx response that declares a schema
    pub success_responses: Vec<(String, Value)>,
}

impl Endpoint {
    /// Method, path, summary, description and tags as one searchable string
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.method,
            self.path,
            self.summary,
            self.description,
            self.tags.join(" ")
        )
    }
}

/// Parsed API specification
#[derive(Debug, Clone, Default)]
pub struct ApiSpecification {
    pub info: ApiInfo,
    /// Endpoints in document order
    pub endpoints: Vec<Endpoint>,
    /// Named schemas (`components.schemas` or Swagger 2 `definitions`)
    pub schemas: Map<String, Value>,
}

impl ApiSpecification {
    /// Parse a specification from raw text (JSON, or YAML as a fallback)
    pub fn parse(raw: &str) -> Result<Self, ExtractError> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(json_err) => serde_yaml::from_str(raw).map_err(|_| {
                ExtractError::InvalidDocument(format!("specification is not JSON: {}", json_err))
            })?,
        };
        Self::from_value(&value)
    }

    /// Project a decoded document onto an [`ApiSpecification`]
    pub fn from_value(doc: &Value) -> Result<Self, ExtractError> {
        let root = doc.as_object().ok_or_else(|| {
            ExtractError::InvalidDocument("specification root is not an object".to_string())
        })?;

        let has_paths = root.get("paths").is_some_and(Value::is_object);
        let schemas = root
            .get("components")
            .and_then(|c| c.get("schemas"))
            .or_else(|| root.get("definitions"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        if !has_paths && schemas.is_empty() {
            return Err(ExtractError::InvalidDocument(
                "document has neither paths nor schemas".to_string(),
            ));
        }

        let info = root
            .get("info")
            .and_then(|i| ApiInfo::deserialize(i).ok())
            .unwrap_or_default();

        let mut endpoints = Vec::new();
        if let Some(paths) = root.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                let Some(item) = item.as_object() else {
                    continue;
                };
                for (method, operation) in item {
                    if !HTTP_METHODS.contains(&method.to_lowercase().as_str()) {
                        continue;
                    }
                    if let Some(operation) = operation.as_object() {
                        endpoints.push(parse_operation(path, method, operation));
                    }
                }
            }
        }

        Ok(Self {
            info,
            endpoints,
            schemas,
        })
    }
}

fn parse_operation(path: &str, method: &str, op: &Map<String, Value>) -> Endpoint {
    let text = |key: &str| {
        op.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let tags = op
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let request_schema = op
        .get("requestBody")
        .and_then(media_schema)
        .or_else(|| swagger_body_parameter(op));

    let success_responses = op
        .get("responses")
        .and_then(Value::as_object)
        .map(|responses| {
            responses
                .iter()
                .filter(|(code, _)| code.starts_with('2'))
                .filter_map(|(code, response)| {
                    media_schema(response)
                        .or_else(|| response.get("schema").cloned())
                        .map(|schema| (code.clone(), schema))
                })
                .collect()
        })
        .unwrap_or_default();

    Endpoint {
        method: method.to_uppercase(),
        path: path.to_string(),
        summary: text("summary"),
        description: text("description"),
        tags,
        request_schema,
        success_responses,
    }
}

/// Schema of the first media type under `content` (OpenAPI 3)
fn media_schema(holder: &Value) -> Option<Value> {
    holder
        .get("content")
        .and_then(Value::as_object)
        .and_then(|content| content.values().find_map(|media| media.get("schema")))
        .cloned()
}

/// Schema of the `in: body` parameter (Swagger 2)
fn swagger_body_parameter(op: &Map<String, Value>) -> Option<Value> {
    op.get("parameters")
        .and_then(Value::as_array)?
        .iter()
        .find(|p| p.get("in").and_then(Value::as_str) == Some("body"))
        .and_then(|p| p.get("schema"))
        .cloned()
}
