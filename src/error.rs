//! Error handling for the Storedash data layer

use std::fmt;
use serde::Deserialize;
use thiserror::Error;

/// Unified error type for the Storedash data layer
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A write was attempted without an active session
    #[error("not authenticated")]
    NotAuthenticated,

    /// Any failure reported by the remote table store
    #[error("store error: {0}")]
    Store(StoreError),

    /// Client-side validation failures, raised before a request is sent
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a new store error from a plain message
    pub fn store<T: fmt::Display>(msg: T) -> Self {
        Error::Store(StoreError::from_message(msg))
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }
}

/// Error details reported by the remote table store.
///
/// Mirrors the PostgREST error body; every field is optional because the
/// store omits whatever it has no information for.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreError {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,

    /// HTTP status of the failed response, when one was received
    #[serde(skip)]
    pub status: Option<u16>,
}

impl StoreError {
    /// Create a store error carrying only a message
    pub fn from_message<T: fmt::Display>(msg: T) -> Self {
        StoreError {
            message: Some(msg.to_string()),
            ..StoreError::default()
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(status) = self.status {
            parts.push(format!("Status: {}", status));
        }
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        if parts.is_empty() {
            parts.push("unknown store error".to_string());
        }
        write!(f, "{}", parts.join(", "))
    }
}
