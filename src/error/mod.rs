//! Error types for errata's own fallible surfaces.
//!
//! These are the errors an attempt can fail with before classification turns
//! them into an [`ErrorAnalysis`](crate::recovery::ErrorAnalysis).

use std::time::Duration;

use thiserror::Error;

/// Primary error type for transport, configuration, and upstream failures.
#[derive(Error, Debug)]
pub enum ErrataError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
        retry_after_ms: Option<u64>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// An error value handed over by a caller in whatever shape the provider
    /// SDK produced it.
    #[error("Upstream error: {0}")]
    Upstream(serde_json::Value),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ErrataError {
    /// Create an API error without a parsed body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            body: None,
            retry_after_ms: None,
        }
    }

    /// Create an API error carrying the decoded JSON body.
    pub fn api_with_body(status: u16, message: impl Into<String>, body: serde_json::Value) -> Self {
        Self::Api {
            status,
            message: message.into(),
            body: Some(body),
            retry_after_ms: None,
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided hint for how long to wait before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api {
                retry_after_ms: Some(ms),
                ..
            } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ErrataError>;
