use super::{Method, ParameterStrategy, QueryParams, RequestBody, RequestSpec};
use crate::{Error, ErrorContext, Result};
use serde_json::Value;

/// Sends a caller-supplied JSON document as the request body.
///
/// The caller owns the whole payload: no query or form parameters are added,
/// so the client's credential field is not injected either.
#[derive(Debug, Clone, Default)]
pub struct RawJsonStrategy {
    payload: Option<Value>,
}

impl RawJsonStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `json` as the payload.
    pub fn set(mut self, json: &str) -> Result<Self> {
        let payload = serde_json::from_str(json).map_err(|e| {
            Error::configuration_with_context(
                "invalid JSON payload, cannot decode",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("raw_json_strategy"),
            )
        })?;
        self.payload = Some(payload);
        Ok(self)
    }

    /// Use an already-built tree as the payload.
    pub fn with_value(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl ParameterStrategy for RawJsonStrategy {
    fn build(&self, path: &str, method: Method, _defaults: &QueryParams) -> Result<RequestSpec> {
        let payload = self.payload.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                "JSON payload must be set before the request is built",
                ErrorContext::new().with_source("raw_json_strategy"),
            )
        })?;

        if method == Method::Get {
            return Err(Error::configuration_with_context(
                "GET requests cannot carry a JSON body",
                ErrorContext::new()
                    .with_field_path(path)
                    .with_source("raw_json_strategy"),
            ));
        }

        Ok(RequestSpec {
            method,
            path: path.to_string(),
            query: QueryParams::new(),
            body: RequestBody::Json(payload.clone()),
        })
    }

    fn name(&self) -> &'static str {
        "raw_json"
    }
}
