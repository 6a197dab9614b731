//! Error types for podsnips-core

use thiserror::Error;

/// Main error type for the podsnips-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Persisted state could not be read or written
    #[error("persistence error: {0}")]
    Persist(String),
}

/// Result type alias for podsnips-core
pub type Result<T> = std::result::Result<T, Error>;
