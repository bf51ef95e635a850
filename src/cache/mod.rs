//! Response caching with pluggable backends.
//!
//! Only raw transport bytes are cached. A cache hit is replayed through the
//! same decode path as a fresh response, so cached and uncached calls decode
//! identically.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheManager`] | Key prefixing and hit/miss statistics over a backend |
//! | [`CacheBackend`] | Trait for implementing custom cache backends |
//! | [`MemoryCache`] | In-memory LRU cache with per-entry expiry |
//! | [`NullCache`] | No-op cache for disabling caching |
//! | [`CacheKeyDeriver`] | Fingerprint of method, path and resolved parameters |
//! | [`CacheLifetime`] | Per-call ttl: default, bypass, or explicit seconds |
//!
//! ## Example
//!
//! ```rust
//! use comrade_reader::cache::{CacheConfig, CacheManager, MemoryCache};
//! use std::sync::Arc;
//!
//! let cache = CacheManager::new(CacheConfig::new(), Arc::new(MemoryCache::new(1000)));
//! assert_eq!(cache.backend_name(), "memory");
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::{CacheKey, CacheKeyDeriver};
pub use manager::{CacheConfig, CacheLifetime, CacheManager, CacheStats};
