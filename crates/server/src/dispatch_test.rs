//! Tests for the sink dispatcher

use std::sync::Arc;

use hepflow_protocol::HepPacket;
use tokio::sync::mpsc;

use crate::dispatch::{Dispatcher, SinkHandle, OVERFLOW_LOG_EVERY};
use crate::server::SinkSet;

fn all_sinks() -> SinkSet {
    SinkSet {
        db: true,
        mq: true,
        metrics: true,
    }
}

#[tokio::test]
async fn test_dispatch_reaches_every_enabled_sink() {
    let (dispatcher, queues) = Dispatcher::new(all_sinks(), 16);
    let mut db_rx = queues.db.unwrap();
    let mut mq_rx = queues.mq.unwrap();
    let mut metrics_rx = queues.metrics.unwrap();

    let packet = Arc::new(HepPacket {
        node_id: 77,
        ..Default::default()
    });
    let wire = b"HEP3\x00\x06";

    dispatcher.dispatch(&packet, wire);

    let db_pkt = db_rx.try_recv().unwrap();
    assert_eq!(db_pkt.node_id, 77);
    let metrics_pkt = metrics_rx.try_recv().unwrap();
    assert_eq!(metrics_pkt.node_id, 77);

    // db and metrics share the same allocation
    assert!(Arc::ptr_eq(&db_pkt, &metrics_pkt));

    // mq receives the raw frame, not the decoded form
    let frame = mq_rx.try_recv().unwrap();
    assert_eq!(&frame[..], wire);
}

#[tokio::test]
async fn test_mq_copy_outlives_source_buffer() {
    let (dispatcher, queues) = Dispatcher::new(
        SinkSet {
            mq: true,
            ..Default::default()
        },
        4,
    );
    let mut mq_rx = queues.mq.unwrap();

    let packet = Arc::new(HepPacket::default());
    {
        let wire = vec![1u8, 2, 3, 4];
        dispatcher.dispatch(&packet, &wire);
        drop(wire);
    }

    assert_eq!(&mq_rx.try_recv().unwrap()[..], &[1, 2, 3, 4]);
}

#[tokio::test]
async fn test_disabled_sinks_have_no_queue() {
    let (dispatcher, queues) = Dispatcher::new(SinkSet::default(), 16);
    assert!(queues.db.is_none());
    assert!(queues.mq.is_none());
    assert!(queues.metrics.is_none());

    // Dispatching with nothing enabled is a no-op
    dispatcher.dispatch(&Arc::new(HepPacket::default()), b"x");
    assert_eq!(dispatcher.queue_depths(), crate::QueueDepths::default());
}

#[tokio::test]
async fn test_full_sink_drops_and_counts() {
    let (dispatcher, queues) = Dispatcher::new(all_sinks(), 2);
    let _db_rx = queues.db.unwrap();
    let mut metrics_rx = queues.metrics.unwrap();
    let _mq_rx = queues.mq.unwrap();

    let packet = Arc::new(HepPacket::default());

    // The db queue holds 2; everything past that is shed. The metrics
    // queue is drained as we go and never overflows.
    for _ in 0..10 {
        dispatcher.dispatch(&packet, b"frame");
        let _ = metrics_rx.try_recv();
    }

    assert_eq!(dispatcher.db_overflow(), 8);
    assert_eq!(dispatcher.mq_overflow(), 8);
    assert_eq!(dispatcher.metrics_overflow(), 0);
}

#[tokio::test]
async fn test_overflow_counter_spans_log_interval() {
    let (tx, _rx) = mpsc::channel::<u32>(1);
    let handle = SinkHandle::new("test", tx);

    assert!(handle.offer(0));
    for i in 0..OVERFLOW_LOG_EVERY + 5 {
        assert!(!handle.offer(i as u32));
    }
    assert_eq!(handle.overflow_count(), OVERFLOW_LOG_EVERY + 5);
}

#[tokio::test]
async fn test_closed_sink_does_not_count_overflow() {
    let (tx, rx) = mpsc::channel::<u32>(1);
    let handle = SinkHandle::new("test", tx);
    drop(rx);

    assert!(!handle.offer(1));
    assert_eq!(handle.overflow_count(), 0);
}

#[tokio::test]
async fn test_queue_depth_tracks_backlog() {
    let (dispatcher, queues) = Dispatcher::new(all_sinks(), 8);
    let mut db_rx = queues.db.unwrap();

    let packet = Arc::new(HepPacket::default());
    for _ in 0..3 {
        dispatcher.dispatch(&packet, b"w");
    }

    let depths = dispatcher.queue_depths();
    assert_eq!(depths.db, 3);
    assert_eq!(depths.mq, 3);
    assert_eq!(depths.metrics, 3);

    db_rx.recv().await.unwrap();
    assert_eq!(dispatcher.queue_depths().db, 2);
}
