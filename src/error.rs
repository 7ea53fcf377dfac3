// src/error.rs

//! Unified error handling for the feed builder.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network failure while fetching (DNS, refused connection, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The source answered with anything other than 200
    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Checksum store could not be read or written
    #[error("Checksum I/O error at {}: {source}", .path.display())]
    ChecksumIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A listing link did not follow the path date convention
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Template loading or evaluation failed
    #[error("Render error: {0}")]
    Render(String),

    /// Feed file could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote object upload failed
    #[error("Remote upload error: {0}")]
    RemoteUpload(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
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

    /// Create an extraction error for a single link.
    pub fn extraction(href: &str, message: impl fmt::Display) -> Self {
        Self::Extraction(format!("{href}: {message}"))
    }

    /// Create a render error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }

    /// Create a remote upload error.
    pub fn remote(message: impl fmt::Display) -> Self {
        Self::RemoteUpload(message.to_string())
    }

    pub fn checksum_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ChecksumIo {
            path: path.into(),
            source,
        }
    }

    pub fn local_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalWrite {
            path: path.into(),
            source,
        }
    }
}
