//! Error types for seoforge.
//!
//! Library crates use [`SeoforgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all seoforge operations.
#[derive(Debug, thiserror::Error)]
pub enum SeoforgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to a backend.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or backend response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Generative-text backend error (HTTP status, quota, malformed reply).
    #[error("generation error: {0}")]
    Generation(String),

    /// Reading or writing a delimited catalog failed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// An input row did not carry the required code, name and price fields.
    #[error("malformed input row at line {line}: expected at least 3 fields, found {fields}")]
    MalformedRow { line: u64, fields: usize },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SeoforgeError>;

impl SeoforgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

impl From<csv::Error> for SeoforgeError {
    fn from(err: csv::Error) -> Self {
        Self::Catalog(err.to_string())
    }
}
