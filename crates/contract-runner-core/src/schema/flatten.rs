//! Schema flattening
//!
//! Turns a nested `properties` schema into the set of dotted field paths it
//! declares, so field presence can be tested without a schema validator.

use serde_json::Value;
use std::collections::BTreeSet;

/// Maximum nesting walked before giving up on a (likely self-referential) schema
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Flatten a schema into dotted paths
pub fn flatten(schema: &Value) -> BTreeSet<String> {
    flatten_with_prefix(schema, "")
}

/// Flatten a schema, prefixing every path with `prefix.`
pub fn flatten_with_prefix(schema: &Value, prefix: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    walk(schema, prefix, 0, &mut found);
    found
}

fn walk(schema: &Value, prefix: &str, depth: usize, found: &mut BTreeSet<String>) {
    if depth >= MAX_SCHEMA_DEPTH {
        tracing::warn!(prefix, "schema nesting exceeds {} levels, truncating", MAX_SCHEMA_DEPTH);
        return;
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (name, property) in properties {
        let dotted = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        if property.is_object() {
            walk(property, &dotted, depth + 1, found);
        }
        found.insert(dotted);
    }
}
