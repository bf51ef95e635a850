use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "max_pages", "reader.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "query_form_strategy", "result_assembler")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the reader.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter strategy was used before configuration, a caller JSON
    /// payload was malformed, or the client itself is misconfigured.
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// The response body is not valid structured data or could not be mapped
    /// into the requested type. `body` keeps the offending payload.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    #[error(
        "Resource \"{path}\" was not found on remote server, got a HTTP 404 error while trying to get the resource. \
         Please verify if the resource exists, and if the HTTP method is correct"
    )]
    ResourceNotFound { path: String },

    /// A paginated response is missing (or has malformed) pagination fields.
    #[error("Structural error: {message}{}", format_context(.context))]
    Structural {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Cache backend error: {message}")]
    Cache { message: String },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new structural error with structured context
    pub fn structural_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Structural {
            message: msg.into(),
            context,
        }
    }

    pub fn decode(msg: impl Into<String>, body: impl Into<String>) -> Self {
        Error::Decode {
            message: msg.into(),
            body: body.into(),
        }
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Error::Cache {
            message: msg.into(),
        }
    }

    /// True for the 404-class failure, so callers can branch on "missing resource".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ResourceNotFound { .. })
    }

    /// Raw response body attached to a decode failure.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Structural { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}
