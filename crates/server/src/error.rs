//! Server error types

use thiserror::Error;

/// Errors that can occur while running the ingest server
///
/// Only startup failures surface as errors; per-datagram failures are
/// counted and logged, never propagated.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bind address does not parse as a socket address
    #[error("invalid bind address {addr:?}")]
    Addr { addr: String },

    /// Failed to bind the ingest socket (fatal at startup)
    #[error("failed to bind UDP socket {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
