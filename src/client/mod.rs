//! Client configuration and request orchestration.

mod builder;
mod config;
mod core;
mod request;

pub use builder::ApiClientBuilder;
pub use config::{ReaderConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_FIELD, DEFAULT_TTL_SECS};
pub use self::core::ApiClient;
pub use request::RequestBuilder;
