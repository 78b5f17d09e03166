//! Structured value diffing for JSON documentation blocks
//!
//! Documentation config samples are compared against the real file by
//! value, not by text: object key order is irrelevant, and each changed
//! or retyped leaf is reported with its dotted path. Keys present on only
//! one side are not discrepancies; the documentation may legitimately
//! show an excerpt.

use anyhow::{Context, Result};
use serde_json::Value;

/// A changed leaf value between documentation and the real file
#[derive(Debug, Clone)]
pub struct ValueChange {
    /// Dotted/bracketed path to the leaf (e.g. `server.ports[0]`)
    pub path: String,
    /// Documentation-side value
    pub doc_value: Value,
    /// Actual value in the file
    pub actual_value: Value,
    /// True when the two sides have different JSON types
    pub type_change: bool,
}

/// Compare a documentation JSON block against real file content.
///
/// Returns the value-level changes in deterministic (key-sorted, then
/// index) order. A parse failure on either side is an error for the
/// caller to log and skip.
pub fn compare_json(doc_json: &str, actual_json: &str) -> Result<Vec<ValueChange>> {
    let doc: Value =
        serde_json::from_str(doc_json).context("Failed to parse documentation JSON block")?;
    let actual: Value =
        serde_json::from_str(actual_json).context("Failed to parse actual JSON content")?;

    let mut changes = Vec::new();
    diff_value("", &doc, &actual, &mut changes);
    Ok(changes)
}

fn diff_value(path: &str, doc: &Value, actual: &Value, changes: &mut Vec<ValueChange>) {
    match (doc, actual) {
        (Value::Object(doc_map), Value::Object(actual_map)) => {
            // Sorted key order keeps report output stable
            let mut keys: Vec<&String> = doc_map.keys().collect();
            keys.sort();
            for key in keys {
                if let Some(actual_child) = actual_map.get(key) {
                    let child_path = join_key(path, key);
                    diff_value(&child_path, &doc_map[key], actual_child, changes);
                }
            }
        }
        (Value::Array(doc_items), Value::Array(actual_items)) => {
            if multiset_equal(doc_items, actual_items) {
                return;
            }
            let shared = doc_items.len().min(actual_items.len());
            for index in 0..shared {
                let child_path = format!("{}[{}]", path, index);
                diff_value(&child_path, &doc_items[index], &actual_items[index], changes);
            }
        }
        _ => {
            if doc != actual {
                changes.push(ValueChange {
                    path: path.to_string(),
                    doc_value: doc.clone(),
                    actual_value: actual.clone(),
                    type_change: json_type(doc) != json_type(actual),
                });
            }
        }
    }
}

/// Order-insensitive array equality
fn multiset_equal(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut remaining: Vec<&Value> = b.iter().collect();
    for item in a {
        match remaining.iter().position(|candidate| *candidate == item) {
            Some(index) => {
                remaining.swap_remove(index);
            }
            None => return false,
        }
    }
    true
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Rebuild the minimal structure around a changed leaf.
///
/// Only the path's ancestor keys and the leaf value survive, keeping the
/// rendered report focused on the change rather than the whole document.
pub fn scoped_snippet(path: &str, value: &Value) -> String {
    let mut scoped = value.clone();

    for segment in parse_path(path).into_iter().rev() {
        scoped = match segment {
            PathSegment::Key(key) => {
                let mut map = serde_json::Map::new();
                map.insert(key, scoped);
                Value::Object(map)
            }
            PathSegment::Index(_) => Value::Array(vec![scoped]),
        };
    }

    serde_json::to_string_pretty(&scoped).unwrap_or_else(|_| scoped.to_string())
}

enum PathSegment {
    Key(String),
    Index(usize),
}

fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();

    for part in path.split('.').filter(|p| !p.is_empty()) {
        let mut rest = part;
        if let Some(bracket) = rest.find('[') {
            let key = &rest[..bracket];
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            rest = &rest[bracket..];
            while let Some(close) = rest.find(']') {
                let index = rest[1..close].parse().unwrap_or(0);
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
                if !rest.starts_with('[') {
                    break;
                }
            }
        } else {
            segments.push(PathSegment::Key(rest.to_string()));
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_value_change_ignores_key_order() {
        let changes = compare_json(r#"{"a": 1, "b": 2}"#, r#"{"b": 2, "a": 9}"#).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "a");
        assert_eq!(changes[0].doc_value, json!(1));
        assert_eq!(changes[0].actual_value, json!(9));
        assert!(!changes[0].type_change);
    }

    #[test]
    fn test_type_change_detected() {
        let changes = compare_json(r#"{"port": "8080"}"#, r#"{"port": 8080}"#).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "port");
        assert!(changes[0].type_change);
    }

    #[test]
    fn test_nested_path() {
        let changes = compare_json(
            r#"{"server": {"host": "localhost", "port": 80}}"#,
            r#"{"server": {"host": "localhost", "port": 443}}"#,
        )
        .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "server.port");
    }

    #[test]
    fn test_array_order_ignored() {
        let changes = compare_json(r#"{"tags": ["a", "b"]}"#, r#"{"tags": ["b", "a"]}"#).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_array_value_change_reports_index() {
        let changes = compare_json(r#"{"ports": [80, 443]}"#, r#"{"ports": [80, 8443]}"#).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "ports[1]");
    }

    #[test]
    fn test_added_and_removed_keys_ignored() {
        let changes = compare_json(r#"{"a": 1}"#, r#"{"a": 1, "b": 2}"#).unwrap();
        assert!(changes.is_empty());

        let changes = compare_json(r#"{"a": 1, "extra": true}"#, r#"{"a": 1}"#).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_parse_failure_is_error() {
        assert!(compare_json("{not json", "{}").is_err());
        assert!(compare_json("{}", "{not json").is_err());
    }

    #[test]
    fn test_scoped_snippet_rebuilds_ancestors() {
        let snippet = scoped_snippet("server.port", &json!(443));
        let parsed: Value = serde_json::from_str(&snippet).unwrap();
        assert_eq!(parsed, json!({"server": {"port": 443}}));
    }

    #[test]
    fn test_scoped_snippet_with_index() {
        let snippet = scoped_snippet("ports[1]", &json!(8443));
        let parsed: Value = serde_json::from_str(&snippet).unwrap();
        assert_eq!(parsed, json!({"ports": [8443]}));
    }
}
