//! UDP receiver
//!
//! Reads datagrams into pooled buffers and feeds the inbound queue. Each
//! read carries a one-second deadline so the stop flag is observed at
//! every iteration boundary; shutdown needs no extra cancellation
//! machinery and completes within one deadline.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use crossfire::MAsyncTx;
use hepflow_protocol::MAX_PACKET_SIZE;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::buffer_pool::BufferPool;
use crate::stats::HepStats;
use crate::{Result, ServerError};

/// Per-iteration read deadline bounding shutdown latency
pub(crate) const READ_DEADLINE: Duration = Duration::from_secs(1);

/// Single-socket datagram receiver
pub(crate) struct Receiver {
    socket: UdpSocket,
    pool: Arc<BufferPool>,
    stats: Arc<HepStats>,
    inbound: MAsyncTx<BytesMut>,
    running: Arc<AtomicBool>,
}

impl Receiver {
    pub(crate) fn new(
        socket: UdpSocket,
        pool: Arc<BufferPool>,
        stats: Arc<HepStats>,
        inbound: MAsyncTx<BytesMut>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            socket,
            pool,
            stats,
            inbound,
            running,
        }
    }

    /// Run until the stop flag clears
    ///
    /// Consumes the receiver; dropping its sender on exit closes the
    /// inbound queue, which is what lets the workers drain and stop.
    pub(crate) async fn run(self) {
        while self.running.load(Ordering::Relaxed) {
            let mut buf = self.pool.acquire();

            let n = match timeout(READ_DEADLINE, self.socket.recv_from(&mut buf)).await {
                // Deadline passed; loop around and re-check the stop flag
                Err(_) => {
                    self.pool.release(buf);
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "udp read error");
                    self.pool.release(buf);
                    continue;
                }
                Ok(Ok((n, _peer))) => n,
            };

            if n > MAX_PACKET_SIZE {
                warn!(bytes = n, max = MAX_PACKET_SIZE, "received oversized packet");
                self.stats.error();
                self.pool.release(buf);
                continue;
            }

            self.stats.packet_received();
            buf.truncate(n);

            // Backpressure: a full inbound queue stalls this loop and lets
            // the kernel socket buffer absorb the burst.
            if self.inbound.send(buf).await.is_err() {
                debug!("inbound queue closed, receiver exiting");
                break;
            }
        }
    }
}

/// Bind the ingest socket
///
/// Startup bind failures are fatal; everything the receiver hits later is
/// logged and survived.
pub(crate) fn bind_socket(addr: &str, recv_buffer_size: usize) -> Result<UdpSocket> {
    let sock_addr: SocketAddr = addr.parse().map_err(|_| ServerError::Addr {
        addr: addr.to_owned(),
    })?;

    open_socket(sock_addr, recv_buffer_size).map_err(|source| ServerError::Bind {
        addr: addr.to_owned(),
        source,
    })
}

fn open_socket(addr: SocketAddr, recv_buffer_size: usize) -> std::io::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;

    // An enlarged receive buffer absorbs capture-agent bursts while the
    // inbound queue is backed up
    if let Err(e) = socket.set_recv_buffer_size(recv_buffer_size) {
        warn!(
            error = %e,
            requested_size = recv_buffer_size,
            "failed to set UDP SO_RCVBUF"
        );
    }

    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}
