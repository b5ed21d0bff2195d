//! Error types for the Lavender shared library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Lavender client wrappers.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error (property files, templates, token cache)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// HTTP transport error (Google Calendar API)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Calendar API rejected a request
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Stored attribute could not be decoded into the domain shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Encryption or decryption failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),
}
