//! Reader configuration.

use crate::params::QueryParams;
use crate::response::KeyCasing;
use crate::transport::Timeouts;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TOKEN_FIELD: &str = "token";
pub const DEFAULT_TTL_SECS: i64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Immutable client configuration.
///
/// Can be written out in YAML:
///
/// ```yaml
/// base_url: https://api.example.org
/// token: s3cret
/// token_field: api_key
/// headers:
///   Accept-Language: pl
/// default_ttl_secs: 60
/// key_casing: recursive
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub base_url: String,
    /// Static credential attached to the query of every key/value request.
    pub token: Option<String>,
    pub token_field: String,
    /// Sent on top of `Content-Type: application/json`; same-named headers win.
    pub headers: BTreeMap<String, String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Used when a call does not pick its own lifetime. Negative disables caching.
    pub default_ttl_secs: i64,
    pub key_casing: KeyCasing,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            headers: BTreeMap::new(),
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_ttl_secs: DEFAULT_TTL_SECS,
            key_casing: KeyCasing::default(),
        }
    }
}

impl ReaderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                "invalid reader configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("reader_config"),
            )
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                "cannot read reader configuration",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(e.to_string())
                    .with_source("reader_config"),
            )
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Override fields from the environment:
    /// - `COMRADE_API_TOKEN` (only when no token is configured)
    /// - `COMRADE_HTTP_TIMEOUT_SECS`
    /// - `COMRADE_CONNECT_TIMEOUT_SECS`
    /// - `COMRADE_CACHE_TTL_SECS`
    ///
    /// Values that do not parse are ignored.
    pub fn apply_env(mut self) -> Self {
        if self.token.is_none() {
            self.token = env::var("COMRADE_API_TOKEN").ok().filter(|t| !t.is_empty());
        }
        if let Some(secs) = env_parse::<u64>("COMRADE_HTTP_TIMEOUT_SECS") {
            self.read_timeout_secs = secs;
        }
        if let Some(secs) = env_parse::<u64>("COMRADE_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_parse::<i64>("COMRADE_CACHE_TTL_SECS") {
            self.default_ttl_secs = secs;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "base_url is required",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("reader_config"),
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                "base_url is not a valid URL",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string())
                    .with_source("reader_config"),
            )
        })?;
        for (field, secs) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
        ] {
            if secs == 0 {
                return Err(Error::configuration_with_context(
                    "timeouts must be at least one second",
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("reader_config"),
                ));
            }
        }
        if self.token_field.is_empty() {
            return Err(Error::configuration_with_context(
                "token_field must not be empty",
                ErrorContext::new()
                    .with_field_path("token_field")
                    .with_source("reader_config"),
            ));
        }
        Ok(())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            read: Duration::from_secs(self.read_timeout_secs),
        }
    }

    /// Query values injected before a parameter strategy runs.
    pub fn credential_params(&self) -> QueryParams {
        self.token
            .iter()
            .map(|token| (self.token_field.clone(), token.clone()))
            .collect()
    }

    /// Default JSON content type merged with the configured headers.
    /// Header names compare case-insensitively.
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]);
        for (name, value) in &self.headers {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// `base_url` joined with `path`.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.token_field, "token");
        assert_eq!(config.default_ttl_secs, 500);
        assert_eq!(config.timeouts(), Timeouts::default());
        assert_eq!(config.key_casing, KeyCasing::TopLevel);
    }

    #[test]
    fn parses_yaml() {
        let config = ReaderConfig::from_yaml_str(
            "base_url: https://api.example.org\n\
             token: s3cret\n\
             token_field: api_key\n\
             headers:\n  Accept-Language: pl\n\
             default_ttl_secs: -1\n\
             key_casing: recursive\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.org");
        assert_eq!(config.token_field, "api_key");
        assert_eq!(config.default_ttl_secs, -1);
        assert_eq!(config.key_casing, KeyCasing::Recursive);
        assert_eq!(config.read_timeout_secs, 15);
        assert_eq!(
            config.credential_params().get("api_key").map(String::as_str),
            Some("s3cret")
        );
    }

    #[test]
    fn invalid_yaml_is_a_configuration_error() {
        let err = ReaderConfig::from_yaml_str("base_url: [unterminated").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = ReaderConfig::from_file("/nonexistent/comrade-reader.yaml").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn validation() {
        assert!(ReaderConfig::default().validate().is_err());
        assert!(ReaderConfig::new("not a url").validate().is_err());
        assert!(ReaderConfig::new("http://localhost:8005").validate().is_ok());
    }

    #[test]
    fn caller_headers_override_content_type_case_insensitively() {
        let mut config = ReaderConfig::new("http://localhost");
        config
            .headers
            .insert("content-type".into(), "text/plain".into());
        config.headers.insert("X-Api-Client".into(), "comrade".into());

        let headers = config.effective_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("text/plain"));
        assert!(!headers.contains_key("Content-Type"));
    }

    #[test]
    fn no_token_means_no_credential_params() {
        assert!(ReaderConfig::new("http://localhost").credential_params().is_empty());
    }

    #[test]
    fn url_joining() {
        let config = ReaderConfig::new("http://localhost:8005/");
        assert_eq!(config.url_for("/colors"), "http://localhost:8005/colors");
        assert_eq!(config.url_for("colors"), "http://localhost:8005/colors");
    }
}
