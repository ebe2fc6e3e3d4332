//! Sink error types

use thiserror::Error;

/// Errors surfaced by sink backends
#[derive(Debug, Error)]
pub enum SinkError {
    /// The store or publisher backend rejected a write
    #[error("sink backend error: {0}")]
    Backend(String),

    /// Failed to bind the scrape endpoint
    #[error("failed to bind scrape endpoint {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Create a backend error from any displayable cause
    pub fn backend(cause: impl std::fmt::Display) -> Self {
        Self::Backend(cause.to_string())
    }
}
