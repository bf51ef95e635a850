//! snake_case to camelCase key normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How deep key normalization goes before object mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCasing {
    /// Rename the keys of the mapped object only; nested objects keep theirs.
    #[default]
    TopLevel,
    /// Rename keys at every depth.
    Recursive,
}

impl KeyCasing {
    pub fn apply(self, tree: Value) -> Value {
        match self {
            KeyCasing::TopLevel => normalize_top_level(tree),
            KeyCasing::Recursive => normalize_keys(tree),
        }
    }
}

/// `current_page` -> `currentPage`.
///
/// Underscore-separated segments are joined with their first character
/// upper-cased, then the first character of the result is lower-cased. Empty
/// segments disappear, so `_id` becomes `id`. Keys without underscores only
/// get their first character lower-cased.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for segment in key.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if out.is_empty() {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Rename the keys of a top-level object. Anything else is returned as is.
pub fn normalize_top_level(tree: Value) -> Value {
    match tree {
        Value::Object(map) => Value::Object(normalize_object(map)),
        other => other,
    }
}

/// Rename the keys of one object, leaving its values untouched.
pub fn normalize_object(map: Map<String, Value>) -> Map<String, Value> {
    rename(map, |v| v)
}

/// Rename every object key at every depth, including objects inside arrays.
pub fn normalize_keys(tree: Value) -> Value {
    match tree {
        Value::Object(map) => Value::Object(rename(map, normalize_keys)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

// On a collision after renaming, the later key wins.
fn rename(map: Map<String, Value>, mut value: impl FnMut(Value) -> Value) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (to_camel_case(&k), value(v)))
        .collect()
}
