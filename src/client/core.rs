use crate::cache::{CacheKeyDeriver, CacheLifetime, CacheManager, CacheStats};
use crate::client::config::ReaderConfig;
use crate::client::request::RequestBuilder;
use crate::params::{Method, ParameterStrategy, QueryFormStrategy};
use crate::response::{ObjectMapper, ResponseHandle, SerdeMapper};
use crate::transport::{Transport, TransportRequest};
use crate::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Client for a JSON HTTP API.
///
/// Cloning is cheap; clones share the transport, the cache and the mapper.
/// The configuration is immutable: `with_*` methods return a new client.
pub struct ApiClient<M = SerdeMapper> {
    pub(crate) config: Arc<ReaderConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cache: Arc<CacheManager>,
    pub(crate) mapper: Arc<M>,
    pub(crate) keys: CacheKeyDeriver,
}

impl<M> Clone for ApiClient<M> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: self.transport.clone(),
            cache: self.cache.clone(),
            mapper: self.mapper.clone(),
            keys: self.keys,
        }
    }
}

impl ApiClient<SerdeMapper> {
    /// Client with the default transport, an in-memory cache and the serde mapper.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        crate::client::builder::ApiClientBuilder::new()
            .base_url(base_url)
            .build()
    }
}

impl<M: ObjectMapper> ApiClient<M> {
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// A client sending `headers` in place of the current extra headers.
    pub fn with_headers(&self, headers: BTreeMap<String, String>) -> Self {
        self.reconfigured(|config| config.headers = headers)
    }

    /// A client sending the credential under `field` instead.
    pub fn with_token_field(&self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.reconfigured(|config| config.token_field = field)
    }

    fn reconfigured(&self, change: impl FnOnce(&mut ReaderConfig)) -> Self {
        let mut config = (*self.config).clone();
        change(&mut config);
        Self {
            config: Arc::new(config),
            ..self.clone()
        }
    }

    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder<'_, M> {
        RequestBuilder::new(self, method, path.into())
    }

    pub fn get(&self, path: impl Into<String>) -> RequestBuilder<'_, M> {
        self.request(Method::Get, path)
    }

    pub fn post(&self, path: impl Into<String>) -> RequestBuilder<'_, M> {
        self.request(Method::Post, path)
    }

    pub fn put(&self, path: impl Into<String>) -> RequestBuilder<'_, M> {
        self.request(Method::Put, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder<'_, M> {
        self.request(Method::Delete, path)
    }

    /// Run one call: resolve parameters, consult the cache, call the transport
    /// on a miss and store the raw reply.
    ///
    /// Without a strategy an empty [`QueryFormStrategy`] is used, so the
    /// credential is still attached.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        strategy: Option<&dyn ParameterStrategy>,
        lifetime: CacheLifetime,
    ) -> Result<ResponseHandle<M>> {
        let fallback = QueryFormStrategy::empty();
        let strategy = strategy.unwrap_or(&fallback);
        let spec = strategy.build(path, method, &self.config.credential_params())?;
        debug!(strategy = strategy.name(), %method, path, "resolved request parameters");

        let ttl = lifetime.resolve(self.config.default_ttl_secs);
        let key = match ttl {
            Some(_) if self.cache.is_enabled() => Some(self.keys.key(method, path, &spec)?),
            _ => None,
        };

        if let Some(key) = &key {
            debug!(cache_key = %key, "looking up cached response");
            match self.cache.fetch(key).await {
                Ok(Some(body)) => {
                    info!(%method, path, cache_key = %key, "serving response from cache");
                    return Ok(self.handle(body, true));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(cache_key = %key, backend = self.cache.backend_name(), "cache fetch failed: {}", e);
                    return Err(e);
                }
            }
        }

        let headers = self.config.effective_headers();
        let request = TransportRequest {
            url: self.config.url_for(&spec.path),
            spec: &spec,
            headers: &headers,
            timeouts: self.config.timeouts(),
        };

        let started = Instant::now();
        let response = self.transport.send(request).await.map_err(|e| {
            if e.is_not_found() {
                warn!(%method, path, "remote resource not found");
                Error::ResourceNotFound {
                    path: path.to_string(),
                }
            } else {
                Error::Transport(e)
            }
        })?;
        info!(
            %method,
            path,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transport call completed"
        );

        if let (Some(key), Some(ttl)) = (&key, ttl) {
            if let Err(e) = self.cache.save(key, response.body.clone(), ttl).await {
                warn!(cache_key = %key, backend = self.cache.backend_name(), "cache save failed: {}", e);
                return Err(e);
            }
        }

        Ok(self.handle(response.body, false))
    }

    fn handle(&self, body: Bytes, cached: bool) -> ResponseHandle<M> {
        ResponseHandle::new(body, self.mapper.clone())
            .with_key_casing(self.config.key_casing)
            .from_cache(cached)
    }
}
