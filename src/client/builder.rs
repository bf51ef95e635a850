use crate::cache::{CacheBackend, CacheConfig, CacheKeyDeriver, CacheManager, MemoryCache};
use crate::client::config::ReaderConfig;
use crate::client::core::ApiClient;
use crate::response::{KeyCasing, ObjectMapper, SerdeMapper};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Starts from [`ReaderConfig::default`] with environment overrides applied
/// (see [`ReaderConfig::apply_env`]); explicit setters take precedence.
pub struct ApiClientBuilder<M = SerdeMapper> {
    config: ReaderConfig,
    transport: Option<Arc<dyn Transport>>,
    cache_backend: Option<Arc<dyn CacheBackend>>,
    cache_config: CacheConfig,
    mapper: M,
}

impl ApiClientBuilder<SerdeMapper> {
    pub fn new() -> Self {
        Self::from_config(ReaderConfig::default().apply_env())
    }

    /// Use `config` as is, without environment overrides.
    pub fn from_config(config: ReaderConfig) -> Self {
        Self {
            config,
            transport: None,
            cache_backend: None,
            cache_config: CacheConfig::default(),
            mapper: SerdeMapper,
        }
    }
}

impl<M: ObjectMapper> ApiClientBuilder<M> {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Static credential sent as a query parameter.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Query parameter name for the credential (default `token`).
    pub fn token_field(mut self, field: impl Into<String>) -> Self {
        self.config.token_field = field.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.config.headers = headers;
        self
    }

    /// Rounded up to whole seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_secs = ceil_secs(timeout);
        self
    }

    /// Rounded up to whole seconds.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout_secs = ceil_secs(timeout);
        self
    }

    /// Lifetime for calls that do not set one; negative disables caching.
    pub fn default_ttl_secs(mut self, secs: i64) -> Self {
        self.config.default_ttl_secs = secs;
        self
    }

    pub fn key_casing(mut self, casing: KeyCasing) -> Self {
        self.config.key_casing = casing;
        self
    }

    /// Replace the HTTP transport (primarily for testing).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the default in-memory cache.
    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn mapper<N: ObjectMapper>(self, mapper: N) -> ApiClientBuilder<N> {
        ApiClientBuilder {
            config: self.config,
            transport: self.transport,
            cache_backend: self.cache_backend,
            cache_config: self.cache_config,
            mapper,
        }
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient<M>> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(self.config.timeouts())?),
        };
        let backend = self
            .cache_backend
            .unwrap_or_else(|| Arc::new(MemoryCache::default()));

        Ok(ApiClient {
            config: Arc::new(self.config),
            transport,
            cache: Arc::new(CacheManager::new(self.cache_config, backend)),
            mapper: Arc::new(self.mapper),
            keys: CacheKeyDeriver::new(),
        })
    }
}

fn ceil_secs(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

impl Default for ApiClientBuilder<SerdeMapper> {
    fn default() -> Self {
        Self::new()
    }
}
