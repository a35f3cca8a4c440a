//! Nested JSON flattening
//!
//! Converts arbitrarily nested API records into single-level rows whose
//! composite column names are built by joining ancestor keys with `_`.
//!
//! # Rules
//!
//! - Nested objects recurse; child keys become `<parent>_<child>`.
//! - Arrays containing objects expand per element: `<parent>_<index>_<child>`.
//! - Arrays of scalars are serialized whole as one JSON string under
//!   `<parent>`, keeping column growth bounded for variable-length lists
//!   (phone numbers, address lines).
//! - Composite keys longer than [`MAX_KEY_LENGTH`] bytes are truncated.
//!   Truncation can collide two distinct fields; the last one written wins.
//!   This is a known, accepted risk for pathologically deep records.
//!
//! Input is assumed acyclic (API responses are tree-shaped JSON). Recursion
//! is additionally bounded by a depth cap; anything deeper is serialized as
//! a JSON string.

use crate::types::{JsonObject, JsonValue, Row};

/// Maximum length of a flattened column name, in bytes
pub const MAX_KEY_LENGTH: usize = 64;

/// Recursion bound; subtrees deeper than this are stringified
const MAX_DEPTH: usize = 32;

/// Flatten a nested record into a single-level row
pub fn flatten(record: &JsonObject) -> Row {
    let mut row = Row::new();
    for (key, value) in record {
        flatten_value(key, value, 0, &mut row);
    }
    row
}

fn flatten_value(key: &str, value: &JsonValue, depth: usize, out: &mut Row) {
    if depth >= MAX_DEPTH {
        insert(out, key, stringify(value));
        return;
    }

    match value {
        JsonValue::Object(map) => {
            for (child, child_value) in map {
                flatten_value(&format!("{key}_{child}"), child_value, depth + 1, out);
            }
        }
        JsonValue::Array(items) => {
            if items.iter().any(JsonValue::is_object) {
                for (i, item) in items.iter().enumerate() {
                    match item {
                        JsonValue::Object(map) => {
                            for (child, child_value) in map {
                                flatten_value(
                                    &format!("{key}_{i}_{child}"),
                                    child_value,
                                    depth + 1,
                                    out,
                                );
                            }
                        }
                        other => insert(out, &format!("{key}_{i}"), other.clone()),
                    }
                }
            } else {
                // Scalar-only list: one stringified column
                insert(out, key, stringify(value));
            }
        }
        leaf => insert(out, key, leaf.clone()),
    }
}

/// Insert under a length-bounded key; collisions are last-writer-wins
fn insert(out: &mut Row, key: &str, value: JsonValue) {
    out.insert(truncate_key(key), value);
}

fn truncate_key(key: &str) -> String {
    if key.len() <= MAX_KEY_LENGTH {
        return key.to_string();
    }
    let mut end = MAX_KEY_LENGTH;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    key[..end].to_string()
}

fn stringify(value: &JsonValue) -> JsonValue {
    match serde_json::to_string(value) {
        Ok(s) => JsonValue::String(s),
        Err(_) => JsonValue::Null,
    }
}
