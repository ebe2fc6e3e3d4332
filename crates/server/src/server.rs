//! The ingest server
//!
//! `HepServer` owns the pipeline: it binds the socket, spawns the workers
//! and the stats reporter, runs the receiver, and tears everything down
//! deterministically. The queues are created at construction and handed
//! out as named receiver halves, so tests can instantiate isolated
//! servers and observe each sink directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::buffer_pool::BufferPool;
use crate::dispatch::{Dispatcher, SinkQueues};
use crate::receiver::{bind_socket, Receiver};
use crate::report::{ErrorReporter, NoopReporter};
use crate::stats::{HepStats, StatsReporter};
use crate::worker::Worker;
use crate::{Result, RECV_BUF_LEN};

/// Which sinks get a queue
///
/// Enablement is decided once at startup by configuration presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSet {
    pub db: bool,
    pub mq: bool,
    pub metrics: bool,
}

/// Ingest server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// UDP bind address
    pub addr: String,

    /// Number of decode workers; 0 selects the available parallelism
    pub workers: usize,

    /// Inbound queue capacity (receiver -> workers)
    pub inbound_queue_size: usize,

    /// Per-sink queue capacity (workers -> sinks)
    pub sink_queue_size: usize,

    /// Kernel receive buffer size request
    pub recv_buffer_size: usize,

    /// Receive buffers pre-allocated in the pool
    pub pool_size: usize,

    /// Interval between stats reports
    pub stats_interval: Duration,

    /// Sinks to create queues for
    pub sinks: SinkSet,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:9060".into(),
            workers: 0,
            inbound_queue_size: 10_000,
            sink_queue_size: 10_000,
            recv_buffer_size: 256 * 1024,
            pool_size: 1024,
            stats_interval: Duration::from_secs(60),
            sinks: SinkSet::default(),
        }
    }
}

/// The HEP ingest server
pub struct HepServer {
    config: ServerConfig,
    stats: Arc<HepStats>,
    pool: Arc<BufferPool>,
    dispatcher: Arc<Dispatcher>,
    reporter: Arc<dyn ErrorReporter>,
    running: Arc<AtomicBool>,
}

impl HepServer {
    /// Create a server and the receiver halves of its sink queues
    pub fn new(config: ServerConfig) -> (Self, SinkQueues) {
        let (dispatcher, queues) = Dispatcher::new(config.sinks, config.sink_queue_size);
        let pool = Arc::new(BufferPool::new(config.pool_size, RECV_BUF_LEN));

        let server = Self {
            config,
            stats: Arc::new(HepStats::new()),
            pool,
            dispatcher: Arc::new(dispatcher),
            reporter: Arc::new(NoopReporter),
            running: Arc::new(AtomicBool::new(false)),
        };

        (server, queues)
    }

    /// Replace the decode-failure reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Get a handle to the ingest counters
    pub fn stats(&self) -> Arc<HepStats> {
        Arc::clone(&self.stats)
    }

    /// Get a handle to the dispatcher (queue depths, overflow counters)
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Check whether the pipeline is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Request a stop; the receiver observes it within one read deadline
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Run the pipeline until cancelled or stopped
    ///
    /// Binding the socket is the only fatal failure. Shutdown drains
    /// deterministically: the receiver exits at its next deadline, its
    /// dropped sender closes the inbound queue, and the workers are
    /// joined once they have consumed what remains.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let socket = bind_socket(&self.config.addr, self.config.recv_buffer_size)?;
        let local_addr = socket.local_addr()?;

        self.running.store(true, Ordering::Relaxed);

        let worker_count = if self.config.workers == 0 {
            std::thread::available_parallelism().map_or(4, |n| n.get())
        } else {
            self.config.workers
        };

        info!(
            addr = %local_addr,
            workers = worker_count,
            inbound_queue = self.config.inbound_queue_size,
            sink_queue = self.config.sink_queue_size,
            "hep input listening"
        );

        let (inbound_tx, inbound_rx) =
            crossfire::mpmc::bounded_async(self.config.inbound_queue_size);

        let mut worker_handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let worker = Worker {
                id,
                inbound: inbound_rx.clone(),
                pool: Arc::clone(&self.pool),
                stats: Arc::clone(&self.stats),
                dispatcher: Arc::clone(&self.dispatcher),
                reporter: Arc::clone(&self.reporter),
            };
            worker_handles.push(tokio::spawn(worker.run()));
        }
        drop(inbound_rx);

        let stats_cancel = CancellationToken::new();
        let stats_handle = tokio::spawn(
            StatsReporter::new(
                Arc::clone(&self.stats),
                Arc::clone(&self.dispatcher),
                self.config.stats_interval,
            )
            .run(stats_cancel.clone()),
        );

        // External cancellation flips the stop flag the receiver polls
        let watcher = {
            let cancel = cancel.clone();
            let running = Arc::clone(&self.running);
            tokio::spawn(async move {
                cancel.cancelled().await;
                running.store(false, Ordering::Relaxed);
            })
        };

        let receiver = Receiver::new(
            socket,
            Arc::clone(&self.pool),
            Arc::clone(&self.stats),
            inbound_tx,
            Arc::clone(&self.running),
        );
        receiver.run().await;

        // Receiver gone, sender dropped: workers drain the queue and exit
        for handle in worker_handles {
            let _ = handle.await;
        }

        stats_cancel.cancel();
        let _ = stats_handle.await;
        watcher.abort();

        self.running.store(false, Ordering::Relaxed);
        info!("hep server stopped");

        Ok(())
    }
}
