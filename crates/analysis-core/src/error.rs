//! Error types for analysis operations.
//!
//! This module defines [`AnalysisError`] which covers every failure that can
//! occur while looking up, computing, or persisting a stock analysis. None of
//! these errors reach the caller of the coalescer; they are logged and
//! degraded at the seam where they occur.

use thiserror::Error;

/// Errors that can occur during analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Network-related errors (connection failures, timeouts, non-success status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by the generative backend.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The backend that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The backend answered but produced no extractable content.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Content could not be decoded into the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache store.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing or rejected configuration (API keys, endpoints).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;
