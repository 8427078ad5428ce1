// src/error.rs

//! Unified error handling for the ETL connectors.

use thiserror::Error;

/// Result type alias for ETL operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// MongoDB driver error
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Record could not be converted to BSON
    #[error("BSON error: {0}")]
    Bson(#[from] bson::ser::Error),

    /// API answered with a non-2xx status
    #[error("API error {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// API answered 2xx but the body is not JSON
    #[error("Non-JSON response from {url}: {snippet}")]
    NonJson { url: String, snippet: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input or payload validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a status error, truncating the body for log output.
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Status {
            url: url.into(),
            status,
            body: snippet(body),
        }
    }

    /// Create a non-JSON error, truncating the body for log output.
    pub fn non_json(url: impl Into<String>, body: &str) -> Self {
        Self::NonJson {
            url: url.into(),
            snippet: snippet(body),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Maximum number of body characters carried in an error.
pub const SNIPPET_LEN: usize = 200;

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}
