//! Error types for wiki-extract
//!
//! This module provides the error type hierarchy using `thiserror`.
//! Degenerate page structure (missing headers, no tables) is never an
//! error: the extractor yields empty collections instead. Errors are
//! reserved for unreadable input, bad configuration and failed downloads.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for wiki-extract operations
#[derive(Error, Debug)]
pub enum Error {
    /// Source file or directory does not exist
    #[error("Input not found: {}", .0.display())]
    InputMissing(PathBuf),

    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Image localization errors
    #[error("Localize error: {0}")]
    Localize(#[from] LocalizeError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A CSS selector failed to compile
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A vocabulary is empty or contains an unusable entry
    #[error("Invalid vocabulary `{name}`: {reason}")]
    InvalidVocabulary {
        /// Vocabulary field name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Failed to parse config {path}: {source}")]
    Json {
        /// Config file path
        path: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Image download and rewrite errors
#[derive(Error, Debug)]
pub enum LocalizeError {
    /// Image URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Server answered with a non-success status
    #[error("HTTP error {status}: {url}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Request timed out
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type alias for wiki-extract operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}

impl From<reqwest::Error> for LocalizeError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            LocalizeError::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            LocalizeError::Network(err.to_string())
        }
    }
}
