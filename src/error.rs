//! Error types for the resilient fetch client.
//!
//! This module defines custom error types using `thiserror` for precise error handling.
//! Retry decisions are made on the variant and status code, never on message text.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while executing a request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The attempt did not complete within the per-attempt timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure (DNS, refused, reset, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-2xx status code
    #[error("HTTP error! status: {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body was not valid JSON
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller abandoned the operation
    #[error("Request cancelled")]
    Cancelled,

    /// The attempt loop ended without recording an error
    #[error("Max retries exceeded after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
}

impl FetchError {
    /// Whether another attempt may succeed.
    ///
    /// Bad request (400) and not found (404) responses are terminal, as are
    /// requests that could not be built and cancelled operations. Everything
    /// else is treated as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::HttpStatus { status, .. } => !matches!(*status, 400 | 404),
            FetchError::InvalidRequest(_)
            | FetchError::Cancelled
            | FetchError::ExhaustedRetries { .. } => false,
            FetchError::Timeout(_) | FetchError::Network(_) | FetchError::Decode(_) => true,
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is a per-attempt timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Convenience type alias for Results with FetchError
pub type FetchResult<T> = Result<T, FetchError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
