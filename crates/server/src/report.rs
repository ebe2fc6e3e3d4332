//! Decode-failure reporting hook
//!
//! Decode failures are counted and dropped locally; operators who run an
//! external error-aggregation endpoint can observe them through this
//! interface. The concrete aggregation client lives outside the core -
//! only the seam is defined here, which also lets tests assert on
//! emissions.

use hepflow_protocol::DecodeError;
use tracing::warn;

/// Receiver for decode failures
pub trait ErrorReporter: Send + Sync {
    /// Called once per frame that failed to decode
    fn decode_failed(&self, error: &DecodeError);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn decode_failed(&self, _error: &DecodeError) {}
}

/// Reporter that surfaces decode failures in the log
///
/// Used as the default wiring; when an aggregation DSN is configured it is
/// attached to each line so the external forwarder can pick it up.
#[derive(Debug, Default)]
pub struct LogReporter {
    dsn: Option<String>,
}

impl LogReporter {
    /// Create a log reporter, optionally tagged with an aggregation DSN
    pub fn new(dsn: Option<String>) -> Self {
        Self { dsn }
    }
}

impl ErrorReporter for LogReporter {
    fn decode_failed(&self, error: &DecodeError) {
        match &self.dsn {
            Some(dsn) => warn!(error = %error, dsn = %dsn, "dropping undecodable packet"),
            None => warn!(error = %error, "dropping undecodable packet"),
        }
    }
}
