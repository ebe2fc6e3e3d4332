//! Codec error types

use thiserror::Error;

/// Errors that can occur while decoding a HEP3 frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The frame does not open with the "HEP3" magic bytes
    #[error("not a HEP3 packet (bad magic)")]
    Magic,

    /// The declared total length does not match the frame length
    #[error("declared length {declared} does not match packet length {actual}")]
    Length { declared: usize, actual: usize },

    /// A chunk claims more bytes than the frame holds
    #[error("chunk needs {need} bytes but only {have} remain")]
    ChunkOverflow { need: usize, have: usize },
}

impl DecodeError {
    /// Create a chunk overflow error
    #[inline]
    pub fn overflow(need: usize, have: usize) -> Self {
        Self::ChunkOverflow { need, have }
    }
}
