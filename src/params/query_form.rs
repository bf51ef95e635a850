use super::{split_path_query, FormParams, Method, ParameterStrategy, QueryParams, RequestBody, RequestSpec};
use crate::{Error, ErrorContext, Result};

/// General-purpose key/value parameters.
///
/// GET and DELETE merge the parameters into the query string. POST and PUT
/// send them as a form body and keep the query for the credential field and
/// any query embedded in the path.
#[derive(Debug, Clone, Default)]
pub struct QueryFormStrategy {
    params: Option<FormParams>,
}

impl QueryFormStrategy {
    /// An unconfigured strategy. Call [`set`](Self::set) before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configured strategy without parameters.
    pub fn empty() -> Self {
        Self {
            params: Some(FormParams::new()),
        }
    }

    pub fn set<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.params = Some(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.to_string())))
                .collect(),
        );
        self
    }

    /// Add one parameter; `None` is kept in the form but never sent.
    pub fn with(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        self.params
            .get_or_insert_with(FormParams::new)
            .insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    pub fn is_configured(&self) -> bool {
        self.params.is_some()
    }
}

impl ParameterStrategy for QueryFormStrategy {
    fn build(&self, path: &str, method: Method, defaults: &QueryParams) -> Result<RequestSpec> {
        let params = self.params.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                "parameters must be set before the request is built",
                ErrorContext::new().with_source("query_form_strategy"),
            )
        })?;

        let (bare_path, embedded) = split_path_query(path);
        let mut query = defaults.clone();
        query.extend(embedded);

        let body = if method.carries_body() {
            RequestBody::Form(params.clone())
        } else {
            query.extend(
                params
                    .iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone()))),
            );
            RequestBody::Empty
        };

        Ok(RequestSpec {
            method,
            path: bare_path.to_string(),
            query,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "query_form"
    }
}
