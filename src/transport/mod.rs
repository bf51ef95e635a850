//! HTTP transport seam.
//!
//! The reader only needs to send a resolved [`RequestSpec`] and get back a
//! status and raw bytes. [`HttpTransport`] does this with `reqwest`; tests and
//! embedders can plug in any other [`Transport`].

mod http;

pub use http::HttpTransport;

use crate::params::RequestSpec;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            read: Duration::from_secs(15),
        }
    }
}

/// One outgoing call.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    /// Base URL joined with [`RequestSpec::path`].
    pub url: String,
    pub spec: &'a RequestSpec,
    pub headers: &'a BTreeMap<String, String>,
    pub timeouts: Timeouts,
}

/// A successful (2xx) reply.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request. Non-2xx replies are reported as
    /// [`TransportError::Status`].
    async fn send(&self, request: TransportRequest<'_>) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Other(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
