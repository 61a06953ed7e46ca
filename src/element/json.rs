//! Nested-record JSON export for element trees.
//!
//! The persisted form mirrors the node fields directly: `kind`, optional
//! `name`, `attrs` as an array of `[key, value]` pairs (order preserved),
//! `children`, and `span` reduced to line numbers. Empty fields are omitted.

use serde_json::{json, Value};

use super::Element;

/// Serialize a tree to its nested-record JSON form.
pub fn to_json(element: &Element) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("kind".to_string(), json!(element.kind.as_str()));
    if let Some(name) = &element.name {
        obj.insert("name".to_string(), json!(name));
    }
    if !element.attrs.is_empty() {
        let attrs: Vec<Value> = element
            .attrs
            .iter()
            .map(|(k, v)| json!([k, v]))
            .collect();
        obj.insert("attrs".to_string(), Value::Array(attrs));
    }
    if !element.children.is_empty() {
        let children: Vec<Value> = element.children.iter().map(to_json).collect();
        obj.insert("children".to_string(), Value::Array(children));
    }
    if let Some(span) = &element.span {
        // Column accounting is approximate; only line numbers are persisted.
        obj.insert(
            "span".to_string(),
            json!({ "start_line": span.start.0, "end_line": span.end.0 }),
        );
    }
    Value::Object(obj)
}
