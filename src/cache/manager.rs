//! Cache manager.

use super::backend::CacheBackend;
use super::key::CacheKey;
use crate::Result;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long a response may be served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheLifetime {
    /// Use the client's configured default (500 seconds unless changed).
    #[default]
    Default,
    /// Neither read nor write the cache.
    Bypass,
    /// Cache for this many seconds; `0` keeps the entry until evicted.
    Seconds(u64),
}

impl CacheLifetime {
    /// Resolve `Default` against the client's configured ttl.
    pub fn resolve(self, default_secs: i64) -> Option<Duration> {
        match self {
            CacheLifetime::Default => CacheLifetime::from(default_secs).resolve(0),
            CacheLifetime::Bypass => None,
            CacheLifetime::Seconds(secs) => Some(Duration::from_secs(secs)),
        }
    }
}

/// Negative values bypass the cache.
impl From<i64> for CacheLifetime {
    fn from(secs: i64) -> Self {
        u64::try_from(secs)
            .map(CacheLifetime::Seconds)
            .unwrap_or(CacheLifetime::Bypass)
    }
}

impl From<i32> for CacheLifetime {
    fn from(secs: i32) -> Self {
        CacheLifetime::from(i64::from(secs))
    }
}

impl From<u64> for CacheLifetime {
    fn from(secs: u64) -> Self {
        CacheLifetime::Seconds(secs)
    }
}

/// Sub-second remainders round up, so a short non-zero ttl never becomes
/// `Seconds(0)`.
impl From<Duration> for CacheLifetime {
    fn from(ttl: Duration) -> Self {
        CacheLifetime::Seconds(ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0))
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}
impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Wraps a [`CacheBackend`] with key prefixing and hit/miss accounting.
///
/// Reads and writes are independent calls. Two concurrent misses on the same
/// key both write; the last write wins.
pub struct CacheManager {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    stats: Arc<AtomicStats>,
}

impl CacheManager {
    pub fn new(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: Arc::new(AtomicStats::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn fetch(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let prefixed = self.prefix_key(key);
        match self.backend.fetch(&prefixed).await {
            Ok(Some(data)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(data))
            }
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn save(&self, key: &CacheKey, payload: Bytes, ttl: Duration) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let prefixed = self.prefix_key(key);
        match self.backend.save(&prefixed, payload, ttl).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        if !self.config.enabled {
            return Ok(false);
        }
        let prefixed = self.prefix_key(key);
        match self.backend.delete(&prefixed).await {
            Ok(d) => {
                if d {
                    self.stats.deletes.fetch_add(1, Ordering::Relaxed);
                }
                Ok(d)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn prefix_key(&self, key: &CacheKey) -> CacheKey {
        if let Some(ref p) = self.config.key_prefix {
            CacheKey::new(format!("{}:{}", p, key.hash))
        } else {
            key.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[test]
    fn lifetime_from_signed_seconds() {
        assert_eq!(CacheLifetime::from(500), CacheLifetime::Seconds(500));
        assert_eq!(CacheLifetime::from(0), CacheLifetime::Seconds(0));
        assert_eq!(CacheLifetime::from(-1), CacheLifetime::Bypass);
    }

    #[test]
    fn lifetime_from_duration_rounds_up() {
        assert_eq!(
            CacheLifetime::from(Duration::from_millis(500)),
            CacheLifetime::Seconds(1)
        );
        assert_eq!(
            CacheLifetime::from(Duration::from_millis(2001)),
            CacheLifetime::Seconds(3)
        );
        assert_eq!(CacheLifetime::from(Duration::from_secs(7)), CacheLifetime::Seconds(7));
        assert_eq!(CacheLifetime::from(Duration::ZERO), CacheLifetime::Seconds(0));
    }

    #[test]
    fn default_lifetime_resolves_against_config() {
        assert_eq!(
            CacheLifetime::Default.resolve(500),
            Some(Duration::from_secs(500))
        );
        assert_eq!(CacheLifetime::Default.resolve(-1), None);
        assert_eq!(CacheLifetime::Bypass.resolve(500), None);
        assert_eq!(CacheLifetime::Seconds(7).resolve(500), Some(Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn stats_count_hits_and_misses() {
        let backend = Arc::new(MemoryCache::new(10));
        let manager = CacheManager::new(CacheConfig::new(), backend);
        let key = CacheKey::from("k");

        assert!(manager.fetch(&key).await.unwrap().is_none());
        manager
            .save(&key, Bytes::from_static(b"{}"), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(manager.fetch(&key).await.unwrap().is_some());

        let stats = manager.stats();
        assert_eq!((stats.hits, stats.misses, stats.sets), (1, 1, 1));
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[tokio::test]
    async fn prefix_is_applied_to_backend_keys() {
        let backend = Arc::new(MemoryCache::new(10));
        let manager = CacheManager::new(
            CacheConfig::new().with_key_prefix("reader"),
            backend.clone(),
        );
        let key = CacheKey::from("abc");
        manager
            .save(&key, Bytes::from_static(b"[]"), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(backend.fetch(&"reader:abc".into()).await.unwrap().is_some());
        assert!(backend.fetch(&key).await.unwrap().is_none());
        assert!(manager.delete(&key).await.unwrap());
    }

    #[tokio::test]
    async fn disabled_manager_never_touches_backend() {
        let backend = Arc::new(MemoryCache::new(10));
        let manager = CacheManager::new(CacheConfig::new().with_enabled(false), backend.clone());
        let key = CacheKey::from("k");
        manager
            .save(&key, Bytes::from_static(b"{}"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(backend.len().await.unwrap(), 0);
        assert_eq!(manager.stats(), CacheStats::default());
    }
}
