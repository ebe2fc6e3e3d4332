//! Decode workers
//!
//! Each worker loops over the shared inbound queue: decode, enrich when
//! SIP-typed, dispatch, recycle the buffer. Workers consume concurrently;
//! no ordering is preserved across them. They exit when the queue is
//! closed and drained, which makes shutdown a deterministic join rather
//! than a timed sleep.

use std::sync::Arc;

use bytes::BytesMut;
use crossfire::MAsyncRx;
use hepflow_protocol::decode;
use tracing::debug;

use crate::buffer_pool::BufferPool;
use crate::dispatch::Dispatcher;
use crate::enrich;
use crate::report::ErrorReporter;
use crate::stats::HepStats;

/// One decode worker
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) inbound: MAsyncRx<BytesMut>,
    pub(crate) pool: Arc<BufferPool>,
    pub(crate) stats: Arc<HepStats>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
}

impl Worker {
    /// Run until the inbound queue is closed and empty
    pub(crate) async fn run(self) {
        debug!(worker_id = self.id, "hep worker started");

        while let Ok(buf) = self.inbound.recv().await {
            self.process(buf);
        }

        debug!(worker_id = self.id, "hep worker stopped");
    }

    /// Handle one datagram and recycle its buffer
    fn process(&self, buf: BytesMut) {
        self.handle(&buf);
        // The dispatcher copied the wire bytes for the mq sink already, so
        // the buffer is free to go back to the pool here.
        self.pool.release(buf);
    }

    fn handle(&self, wire: &[u8]) {
        let mut packet = match decode(wire) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.error();
                self.reporter.decode_failed(&e);
                return;
            }
        };

        if enrich::wants_enrichment(&packet) {
            if let Err(e) = enrich::enrich(&mut packet) {
                self.stats.error();
                debug!(worker_id = self.id, error = %e, "dropping packet with unparseable SIP payload");
                return;
            }
        }

        self.stats.hep_decoded();
        self.dispatcher.dispatch(&Arc::new(packet), wire);
    }
}
