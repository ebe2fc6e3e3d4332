//! Shared sink utilities

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval for rate-limited logging
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Rate-limited error logger
///
/// Under a persistent backend failure every queued message fails; this
/// logs at most once per interval with a count of suppressed errors so
/// operators see the condition without the log drowning in it.
pub struct RateLimitedLogger {
    /// Minimum interval between log lines
    min_interval: Duration,

    /// When the last line was emitted
    last_log_time: Mutex<Option<Instant>>,

    /// Errors since the last log line
    error_count: AtomicU64,

    /// Errors ever recorded
    total_errors: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a logger with the given minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            error_count: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
        }
    }

    /// Record an error and log it if the interval has passed
    ///
    /// Returns true if a line was emitted.
    pub fn error(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        self.total_errors.fetch_add(1, Ordering::Relaxed);

        let should_log = {
            let mut last_time = self.last_log_time.lock();
            let now = Instant::now();

            match *last_time {
                Some(last) if now.duration_since(last) < self.min_interval => false,
                _ => {
                    *last_time = Some(now);
                    true
                }
            }
        };

        if !should_log {
            return false;
        }

        let count = self.error_count.swap(0, Ordering::Relaxed);
        let total = self.total_errors.load(Ordering::Relaxed);

        if count > 1 {
            tracing::error!(
                message = %message,
                error = %error,
                suppressed = count - 1,
                total_errors = total,
                "sink error (rate-limited)"
            );
        } else {
            tracing::error!(
                message = %message,
                error = %error,
                total_errors = total,
                "sink error"
            );
        }
        true
    }

    /// Errors recorded since the last emitted line
    pub fn pending_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Errors ever recorded
    pub fn total_error_count(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}
