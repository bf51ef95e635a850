//! Request-parameter strategies: how caller payloads become wire-level requests.
//!
//! ## Overview
//!
//! A [`ParameterStrategy`] turns a method, a target path and a caller payload
//! into a [`RequestSpec`]: the query string, the form body or the raw JSON body
//! that the transport will send.
//!
//! | Strategy | Payload | Wire shape |
//! |----------|---------|------------|
//! | [`QueryFormStrategy`] | key/value pairs | query for GET/DELETE, form body for POST/PUT |
//! | [`RawJsonStrategy`] | JSON document | raw JSON body only |
//!
//! ## Precedence
//!
//! Query values are merged in a single order for every verb: client defaults
//! (the credential field) first, then the query string embedded in the path,
//! then the caller's parameters. The later source wins on a key collision.

mod json_payload;
mod query_form;

pub use json_payload::RawJsonStrategy;
pub use query_form::QueryFormStrategy;

use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Query parameters. Sorted by key so that equal parameter sets serialize
/// identically.
pub type QueryParams = BTreeMap<String, String>;

/// Form body parameters. `None` values are dropped on the wire.
pub type FormParams = BTreeMap<String, Option<String>>;

/// HTTP verbs supported by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// POST and PUT send caller parameters as a body; GET and DELETE do not.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    Empty,
    Form(FormParams),
    Json(serde_json::Value),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// Fully resolved request shape, built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSpec {
    pub method: Method,
    /// Path appended to the client's base URL.
    pub path: String,
    pub query: QueryParams,
    pub body: RequestBody,
}

impl RequestSpec {
    pub fn form_params(&self) -> Option<&FormParams> {
        match &self.body {
            RequestBody::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            RequestBody::Json(json) => Some(json),
            _ => None,
        }
    }
}

/// Builds the wire-level request shape for one call.
///
/// `defaults` carries query values injected by the client (the credential
/// field). Strategies that send a query must let caller-supplied keys win over
/// them; strategies that fully own the payload may ignore them.
pub trait ParameterStrategy: Send + Sync {
    fn build(&self, path: &str, method: Method, defaults: &QueryParams) -> Result<RequestSpec>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Split `path` into the bare path and the query pairs embedded in it.
pub(crate) fn split_path_query(path: &str) -> (&str, Vec<(String, String)>) {
    match path.split_once('?') {
        Some((bare, query)) => {
            let query = query.split('#').next().unwrap_or_default();
            let pairs = url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
            (bare, pairs)
        }
        None => (path.split('#').next().unwrap_or_default(), Vec::new()),
    }
}
