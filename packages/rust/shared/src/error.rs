//! Error types for NewsGraph.
//!
//! Library crates use [`NewsGraphError`] via `thiserror`.
//! App crates (cli/server) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all NewsGraph operations.
#[derive(Debug, thiserror::Error)]
pub enum NewsGraphError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside a specific provider's domain.
    #[error("network error: {0}")]
    Network(String),

    /// Response parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Search provider error (Google CSE, Tavily).
    #[error("search error: {0}")]
    Search(String),

    /// Scraper provider error (reader API, HTML fetch).
    #[error("scrape error: {0}")]
    Scrape(String),

    /// LLM provider error (chat API, malformed completion).
    #[error("llm error: {0}")]
    Llm(String),

    /// Knowledge graph upload error.
    #[error("graph error: {0}")]
    Graph(String),

    /// Run-history storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (schema mismatch, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Async task failure (join error, panic inside a fan-out task).
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NewsGraphError>;

impl NewsGraphError {
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

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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
