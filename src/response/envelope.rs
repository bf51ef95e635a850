//! Body decoding and `{success, data}` envelope unwrapping.

use crate::{Error, Result};
use serde_json::Value;

/// A decoded response split into its envelope fields.
///
/// When `success` is `true` and `data` is an object or an array, `data` is the
/// effective payload. Otherwise the whole decoded tree is.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: Option<bool>,
    pub data: Option<Value>,
    pub raw: Value,
}

impl Envelope {
    pub fn from_tree(raw: Value) -> Self {
        let success = raw.get("success").and_then(Value::as_bool);
        let data = raw.get("data").cloned();
        Self { success, data, raw }
    }

    pub fn is_wrapped(&self) -> bool {
        self.success == Some(true) && matches!(self.data, Some(Value::Object(_) | Value::Array(_)))
    }

    pub fn into_payload(self) -> Value {
        if self.is_wrapped() {
            self.data.unwrap_or(self.raw)
        } else {
            self.raw
        }
    }
}

/// Parse raw bytes into a tree. The top level must be an object or an array.
pub fn decode(body: &[u8]) -> Result<Value> {
    let tree: Value = serde_json::from_slice(body).map_err(|e| {
        Error::decode(
            format!("Response is not a valid json, decode error: {e}"),
            String::from_utf8_lossy(body),
        )
    })?;

    match tree {
        Value::Object(_) | Value::Array(_) => Ok(tree),
        _ => Err(Error::decode(
            "Response is not a valid json, expected an object or an array",
            String::from_utf8_lossy(body),
        )),
    }
}

pub fn unwrap_envelope(tree: Value) -> Value {
    Envelope::from_tree(tree).into_payload()
}
