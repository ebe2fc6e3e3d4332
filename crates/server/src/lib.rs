//! HEP ingest server - the capture pipeline core
//!
//! Receives HEP3 datagrams over UDP, decodes them on a worker pool,
//! optionally parses embedded SIP payloads, and fans the results out to
//! the sink queues without ever blocking on a slow sink.
//!
//! # Pipeline
//!
//! ```text
//! UDP socket -> Receiver -> inbound queue -> Workers -> Dispatcher
//!                                                          |-> db queue
//!                                                          |-> mq queue
//!                                                          |-> metrics queue
//! ```
//!
//! # Backpressure
//!
//! The receiver-to-worker leg is true backpressure: a full inbound queue
//! stalls the receiver and lets the kernel socket buffer absorb bursts.
//! The worker-to-sink leg is a lossy non-blocking offer: each sink sheds
//! independently, so one slow sink never stalls the pipeline or another
//! sink.

mod buffer_pool;
mod dispatch;
mod enrich;
mod error;
mod receiver;
mod report;
mod server;
mod stats;
mod worker;

pub use buffer_pool::BufferPool;
pub use dispatch::{Dispatcher, QueueDepths, SinkHandle, SinkQueues};
pub use enrich::{enrich, sip_method, wants_enrichment, EnrichError, MIN_SIP_PAYLOAD};
pub use error::ServerError;
pub use report::{ErrorReporter, LogReporter, NoopReporter};
pub use server::{HepServer, ServerConfig, SinkSet};
pub use stats::{HepStats, StatsReporter, StatsSnapshot};

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Receive buffer length: one byte beyond the largest accepted message so
/// an oversized datagram is observable instead of silently truncated.
pub const RECV_BUF_LEN: usize = hepflow_protocol::MAX_PACKET_SIZE + 1;
