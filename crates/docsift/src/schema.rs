//! Terse, human-readable descriptions of JSON-schema fragments
//!
//! Used when summarizing API specifications: a request body or response
//! schema becomes something like `array of Invoice {id, amount, currency}`.

use serde_json::{Map, Value};

/// Deepest level the describer will descend to
pub const MAX_SCHEMA_DEPTH: usize = 3;

/// References are only previewed (property names listed) above this depth
const REF_PREVIEW_DEPTH: usize = 2;

/// Property names listed per object or reference preview
const MAX_LISTED_PROPERTIES: usize = 8;

/// Describe `schema`, resolving `$ref`s against `schemas`
pub fn describe_schema(schema: &Value, schemas: &Map<String, Value>) -> String {
    describe_at(schema, schemas, 0)
}

fn describe_at(schema: &Value, schemas: &Map<String, Value>, depth: usize) -> String {
    let Some(obj) = schema.as_object() else {
        return "any".to_string();
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        let name = ref_name(reference);
        if depth >= REF_PREVIEW_DEPTH {
            return name.to_string();
        }
        let preview = schemas
            .get(name)
            .and_then(|target| target.get("properties"))
            .and_then(Value::as_object)
            .map(|props| list_names(props))
            .filter(|names| !names.is_empty());
        return match preview {
            Some(names) => format!("{} {{{}}}", name, names),
            None => name.to_string(),
        };
    }

    if depth >= MAX_SCHEMA_DEPTH {
        return type_name(obj);
    }

    let is_array = obj.get("type").and_then(Value::as_str) == Some("array")
        || (obj.get("type").is_none() && obj.contains_key("items"));
    if is_array {
        return match obj.get("items") {
            Some(items) => format!("array of {}", describe_at(items, schemas, depth + 1)),
            None => "array".to_string(),
        };
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        if props.is_empty() {
            return "object".to_string();
        }
        return format!("object ({})", list_names(props));
    }

    for combinator in ["allOf", "oneOf", "anyOf"] {
        if let Some(parts) = obj.get(combinator).and_then(Value::as_array) {
            let joiner = if combinator == "allOf" { " & " } else { " | " };
            let described: Vec<String> = parts
                .iter()
                .take(MAX_LISTED_PROPERTIES)
                .map(|part| describe_at(part, schemas, depth + 1))
                .collect();
            if !described.is_empty() {
                return described.join(joiner);
            }
        }
    }

    type_name(obj)
}

/// Last path segment of a `$ref` (`#/components/schemas/Invoice` → `Invoice`)
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

fn list_names(props: &Map<String, Value>) -> String {
    let mut names: Vec<&str> = props
        .keys()
        .take(MAX_LISTED_PROPERTIES)
        .map(String::as_str)
        .collect();
    if props.len() > MAX_LISTED_PROPERTIES {
        names.push("…");
    }
    names.join(", ")
}

fn type_name(obj: &Map<String, Value>) -> String {
    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        return ref_name(reference).to_string();
    }
    match obj.get("type") {
        Some(Value::String(t)) => t.clone(),
        // OpenAPI 3.1 allows `type: ["string", "null"]`
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        _ if obj.contains_key("properties") => "object".to_string(),
        _ => "any".to_string(),
    }
}
