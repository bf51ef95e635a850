//! Cache key derivation.

use crate::params::{Method, RequestSpec};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Fingerprints a resolved request: `sha256(method || path || canonical(spec))`.
///
/// The parameter tree is serialized with object keys sorted at every depth, so
/// the same logical parameters always produce the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheKeyDeriver;

impl CacheKeyDeriver {
    pub fn new() -> Self {
        Self
    }

    pub fn key(&self, method: Method, path: &str, spec: &RequestSpec) -> Result<CacheKey> {
        let tree = serde_json::to_value(spec)
            .map_err(|e| Error::cache(format!("cannot serialize request for cache key: {e}")))?;
        let canonical = serde_json::to_string(&canonicalize(tree))
            .map_err(|e| Error::cache(format!("cannot serialize request for cache key: {e}")))?;

        let mut hasher = Sha256::new();
        hasher.update(method.as_str().as_bytes());
        hasher.update(path.as_bytes());
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Ok(CacheKey::new(hash))
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
