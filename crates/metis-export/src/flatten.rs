//! Result flattening
//!
//! Nested agent payloads become flat `(agent, key_path, value)` rows with
//! dotted object paths and indexed array paths (`a.b`, `a[0].c`). Scalars
//! are stringified, `null` becomes an empty string, and payloads that are
//! neither object nor array collapse to a single `raw` row.

use serde_json::Value;

/// Column header shared by all tabular destinations
pub const HEADER: [&str; 3] = ["Agent", "KeyPath", "Value"];

/// One flattened result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Agent name (result mapping key)
    pub agent: String,
    /// Dotted/indexed path into the payload
    pub key_path: String,
    /// Stringified leaf value
    pub value: String,
}

impl Row {
    fn new(agent: &str, key_path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            agent: agent.to_string(),
            key_path: key_path.into(),
            value: value.into(),
        }
    }
}

/// Flatten a result mapping (agent name -> payload) into rows
#[must_use]
pub fn flatten_results(results: &Value) -> Vec<Row> {
    let Some(map) = results.as_object() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for (agent, payload) in map {
        match payload {
            Value::Object(_) | Value::Array(_) => {
                let mut leaves = Vec::new();
                walk("", payload, &mut leaves);
                for (key_path, value) in leaves {
                    rows.push(Row::new(agent, key_path, value));
                }
            }
            other => rows.push(Row::new(agent, "raw", scalar_to_string(other))),
        }
    }
    rows
}

/// Depth-first walk collecting `(key_path, value)` leaves
fn walk(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                walk(&child_prefix, child, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(&format!("{prefix}[{i}]"), child, out);
            }
        }
        other => out.push((prefix.to_string(), scalar_to_string(other))),
    }
}

/// Stringify a scalar leaf; strings stay unquoted, null is empty
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
