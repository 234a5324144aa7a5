//! Error types for SearchBridge.
//!
//! Library crates use [`SearchBridgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SearchBridge operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchBridgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Per-file extraction failure (unreadable content, malformed front matter).
    #[error("extraction error at {path:?}: {message}")]
    Extract { path: PathBuf, message: String },

    /// Network/transport error talking to the remote index.
    #[error("network error: {0}")]
    Network(String),

    /// The remote index rejected an item's replace call.
    #[error("publish error for '{id}': {message}")]
    Publish {
        id: String,
        message: String,
        inner: Option<String>,
    },

    /// Data validation error (invalid ACL rule, bad base URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SearchBridgeError>;

impl SearchBridgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an extraction error for a source file.
    pub fn extract(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Extract {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
