use crate::cache::CacheLifetime;
use crate::client::core::ApiClient;
use crate::params::{Method, ParameterStrategy, QueryFormStrategy, RawJsonStrategy};
use crate::response::{ObjectMapper, ResponseHandle};
use crate::Result;

/// Builder for a single call.
///
/// ```rust,no_run
/// # async fn run() -> comrade_reader::Result<()> {
/// use comrade_reader::{ApiClient, QueryFormStrategy};
///
/// let client = ApiClient::new("http://localhost:8005")?;
/// let reply = client
///     .post("/post-parameters.php?this_is_a_get_parameter=true")
///     .params(QueryFormStrategy::new().set([("integer", 1)]))
///     .ttl(500)
///     .execute()
///     .await?;
/// println!("{}", reply.plain_response());
/// # Ok(())
/// # }
/// ```
pub struct RequestBuilder<'a, M> {
    client: &'a ApiClient<M>,
    method: Method,
    path: String,
    strategy: Option<Box<dyn ParameterStrategy + 'a>>,
    lifetime: CacheLifetime,
}

impl<'a, M: ObjectMapper> RequestBuilder<'a, M> {
    pub(crate) fn new(client: &'a ApiClient<M>, method: Method, path: String) -> Self {
        Self {
            client,
            method,
            path,
            strategy: None,
            lifetime: CacheLifetime::Default,
        }
    }

    /// Use a parameter strategy for this call.
    pub fn params(mut self, strategy: impl ParameterStrategy + 'a) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Shorthand for `params(QueryFormStrategy::new().set(params))`.
    pub fn form<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.params(QueryFormStrategy::new().set(params))
    }

    /// Shorthand for a [`RawJsonStrategy`] parsed from `json`.
    pub fn json(self, json: &str) -> Result<Self> {
        let strategy = RawJsonStrategy::new().set(json)?;
        Ok(self.params(strategy))
    }

    /// Seconds to cache the reply for; negative bypasses the cache.
    pub fn ttl(mut self, lifetime: impl Into<CacheLifetime>) -> Self {
        self.lifetime = lifetime.into();
        self
    }

    pub fn bypass_cache(self) -> Self {
        self.ttl(CacheLifetime::Bypass)
    }

    pub async fn execute(self) -> Result<ResponseHandle<M>> {
        self.client
            .execute(self.method, &self.path, self.strategy.as_deref(), self.lifetime)
            .await
    }
}
