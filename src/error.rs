//! Error types for API, storage, and configuration failures.
//!
//! ERROR HANDLING
//! ==============
//! Every transport failure is folded into one `ApiError` value. `Display`
//! yields the single human-readable line the UI shows; the variants keep the
//! status and structured body so callers can branch on kind instead of
//! parsing text.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// Failure of an API gateway call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, TLS, reset).
    #[error("A network error occurred: {message}")]
    Network { message: String },

    /// The server answered with a non-success status.
    #[error("Error {status}: {message}")]
    Request {
        status: u16,
        message: String,
        /// The JSON object body, when the server sent one.
        body: Option<Value>,
    },

    /// A precondition checked before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// A success response whose body did not match the expected shape.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// The HTTP client or request URL could not be built.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Classify a non-success response.
    ///
    /// A JSON object body is rendered compactly; otherwise the plain-text body
    /// is used, falling back to `reason` when the body is empty.
    #[must_use]
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let trimmed = body.trim();
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => Self::Request { status, message: value.to_string(), body: Some(value) },
            Ok(Value::String(text)) if !text.is_empty() => Self::Request { status, message: text, body: None },
            _ if !trimmed.is_empty() => Self::Request { status, message: trimmed.to_owned(), body: None },
            _ => Self::Request { status, message: reason.unwrap_or("request failed").to_owned(), body: None },
        }
    }

    /// Wrap a transport error from `reqwest`.
    #[must_use]
    pub fn network(err: &reqwest::Error) -> Self {
        Self::Network { message: err.to_string() }
    }

    /// HTTP status of a `Request` failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the server rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Request { status: 401 | 403, .. })
    }
}

/// Failure writing the session to durable storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Malformed client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}
