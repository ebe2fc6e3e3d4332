//! SIP scanner error types

use thiserror::Error;

/// Hard failures reported by the SIP scanner
///
/// Recorded on [`crate::SipMsg::error`] rather than returned, matching the
/// best-effort parsing model: headers found before the failure stay
/// available to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SipParseError {
    /// The payload was empty or whitespace only
    #[error("empty SIP message")]
    Empty,

    /// The first line was neither a request line nor a status line
    #[error("malformed start line: {0:?}")]
    StartLine(String),
}
