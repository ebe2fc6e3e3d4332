//! Ingest statistics counters and the periodic reporter
//!
//! All counters use relaxed ordering; values are eventually consistent.
//! The reporter logs a summary at each interval and resets the counters,
//! so every log line covers one interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatch::Dispatcher;

/// Process-wide ingest counters
#[derive(Debug, Default)]
pub struct HepStats {
    /// Datagrams accepted off the socket
    pkt_count: AtomicU64,

    /// Frames decoded (and enriched, where applicable) successfully
    hep_count: AtomicU64,

    /// Duplicate frames observed
    ///
    /// Reported but never incremented: the dedup hook exists, the policy
    /// does not.
    dup_count: AtomicU64,

    /// Frames dropped for any per-datagram failure
    err_count: AtomicU64,
}

impl HepStats {
    /// Create new counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            pkt_count: AtomicU64::new(0),
            hep_count: AtomicU64::new(0),
            dup_count: AtomicU64::new(0),
            err_count: AtomicU64::new(0),
        }
    }

    /// Record a datagram accepted off the socket
    #[inline]
    pub fn packet_received(&self) {
        self.pkt_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully decoded frame
    #[inline]
    pub fn hep_decoded(&self) {
        self.hep_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a duplicate frame
    #[inline]
    pub fn duplicate(&self) {
        self.dup_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-datagram failure
    #[inline]
    pub fn error(&self) {
        self.err_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pkt_count: self.pkt_count.load(Ordering::Relaxed),
            hep_count: self.hep_count.load(Ordering::Relaxed),
            dup_count: self.dup_count.load(Ordering::Relaxed),
            err_count: self.err_count.load(Ordering::Relaxed),
        }
    }

    /// Store zero into all counters
    pub fn reset(&self) {
        self.pkt_count.store(0, Ordering::Relaxed);
        self.hep_count.store(0, Ordering::Relaxed);
        self.dup_count.store(0, Ordering::Relaxed);
        self.err_count.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of the ingest counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pkt_count: u64,
    pub hep_count: u64,
    pub dup_count: u64,
    pub err_count: u64,
}

/// Periodic stats logger
///
/// Emits one info line with the interval's counters, resets them, and one
/// line with the current sink queue depths.
pub struct StatsReporter {
    stats: Arc<HepStats>,
    dispatcher: Arc<Dispatcher>,
    period: Duration,
}

impl StatsReporter {
    /// Create a reporter over the given counters and dispatcher
    pub fn new(stats: Arc<HepStats>, dispatcher: Arc<Dispatcher>, period: Duration) -> Self {
        Self {
            stats,
            dispatcher,
            period,
        }
    }

    /// Run the reporter until cancellation
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the first report
        // covers a full interval.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.report(),
            }
        }
    }

    /// Emit one report and reset the counters
    pub fn report(&self) {
        let s = self.stats.snapshot();
        info!(
            pkt = s.pkt_count,
            hep = s.hep_count,
            duplicate = s.dup_count,
            error = s.err_count,
            "packet stats since last report"
        );
        self.stats.reset();

        let depths = self.dispatcher.queue_depths();
        info!(
            db = depths.db,
            mq = depths.mq,
            metrics = depths.metrics,
            "sink queue depth"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::SinkSet;

    #[test]
    fn test_counters_accumulate() {
        let stats = HepStats::new();
        stats.packet_received();
        stats.packet_received();
        stats.hep_decoded();
        stats.error();

        let s = stats.snapshot();
        assert_eq!(s.pkt_count, 2);
        assert_eq!(s.hep_count, 1);
        assert_eq!(s.dup_count, 0);
        assert_eq!(s.err_count, 1);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let stats = HepStats::new();
        stats.packet_received();
        stats.hep_decoded();
        stats.duplicate();
        stats.error();
        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_report_resets_counters() {
        let stats = Arc::new(HepStats::new());
        let (dispatcher, _queues) = Dispatcher::new(SinkSet::default(), 16);
        let reporter = StatsReporter::new(
            Arc::clone(&stats),
            Arc::new(dispatcher),
            Duration::from_secs(60),
        );

        stats.packet_received();
        stats.error();
        reporter.report();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_concurrent_counting() {
        use std::thread;

        let stats = Arc::new(HepStats::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    stats.packet_received();
                    stats.hep_decoded();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let s = stats.snapshot();
        assert_eq!(s.pkt_count, 4000);
        assert_eq!(s.hep_count, 4000);
    }
}
