//! # comrade-reader
//!
//! Client-side reader for JSON HTTP APIs: builds request parameters, caches
//! raw replies and decodes them into typed values, transparently handling a
//! `{success, data}` envelope and paginated collections.
//!
//! ## Overview
//!
//! A call flows through a fixed pipeline:
//!
//! 1. a [`ParameterStrategy`] turns the caller's payload into a [`RequestSpec`]
//!    (query string, form body or raw JSON body), with the configured
//!    credential injected into the query,
//! 2. a [`CacheKeyDeriver`] fingerprints method, path and resolved parameters,
//! 3. on a cache miss the [`Transport`] is called and the raw bytes are stored,
//! 4. the bytes come back as a [`ResponseHandle`] that decodes on demand into a
//!    single object ([`ResponseHandle::decode_one`]) or a list/paginated
//!    [`Collection`] ([`ResponseHandle::decode_many`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use comrade_reader::{ApiClientBuilder, Collection};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Event {
//!     id: u64,
//!     event_title: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> comrade_reader::Result<()> {
//!     let client = ApiClientBuilder::new()
//!         .base_url("https://api.example.org")
//!         .token("your-api-token")
//!         .build()?;
//!
//!     let events: Collection<Event> = client
//!         .get("/events")
//!         .form([("page", 1)])
//!         .execute()
//!         .await?
//!         .decode_many()?;
//!
//!     if let Some(page) = events.as_paginated() {
//!         println!("page {} of {}", page.current_page, page.max_pages);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`params`] | Parameter strategies and the resolved request shape |
//! | [`cache`] | Cache keys, backends and the cache manager |
//! | [`transport`] | Transport seam and the `reqwest` implementation |
//! | [`response`] | Envelope unwrapping, key casing and typed decoding |
//! | [`client`] | Configuration, builder and request orchestration |

pub mod cache;
pub mod client;
pub mod params;
pub mod response;
pub mod transport;

pub use cache::{CacheBackend, CacheKeyDeriver, CacheLifetime, MemoryCache, NullCache};
pub use client::{ApiClient, ApiClientBuilder, ReaderConfig, RequestBuilder};
pub use params::{Method, ParameterStrategy, QueryFormStrategy, RawJsonStrategy, RequestBody, RequestSpec};
pub use response::{Collection, KeyCasing, ObjectMapper, PaginatedResult, ResponseHandle, SerdeMapper};
pub use transport::{HttpTransport, Transport, TransportError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
