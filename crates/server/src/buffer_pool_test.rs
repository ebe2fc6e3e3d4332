//! Tests for the receive buffer pool

use std::sync::atomic::Ordering;

use crate::BufferPool;

#[test]
fn test_preallocates_buffers() {
    let pool = BufferPool::new(8, 1024);
    assert_eq!(pool.available(), 8);
    assert_eq!(pool.capacity(), 8);
    assert_eq!(pool.buffer_len(), 1024);
}

#[test]
fn test_acquire_returns_full_length() {
    let pool = BufferPool::new(2, 512);
    let buf = pool.acquire();
    assert_eq!(buf.len(), 512);
    assert_eq!(pool.available(), 1);
}

#[test]
fn test_release_restores_sliced_view() {
    let pool = BufferPool::new(1, 256);

    let mut buf = pool.acquire();
    buf.truncate(10);
    pool.release(buf);

    let buf = pool.acquire();
    assert_eq!(buf.len(), 256);
    assert_eq!(pool.metrics().returns.load(Ordering::Relaxed), 1);
    assert_eq!(pool.metrics().hits.load(Ordering::Relaxed), 2);
}

#[test]
fn test_empty_pool_allocates() {
    let pool = BufferPool::new(1, 128);
    let a = pool.acquire();
    let b = pool.acquire();
    assert_eq!(b.len(), 128);
    assert_eq!(pool.metrics().misses.load(Ordering::Relaxed), 1);

    pool.release(a);
    pool.release(b);
    // Second release overflows the single-slot pool
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.metrics().drops.load(Ordering::Relaxed), 1);
}

#[test]
fn test_shrunk_buffer_not_pooled() {
    let pool = BufferPool::new(2, 1024);
    let mut buf = pool.acquire();

    // Splitting off most of the buffer leaves too little capacity to reuse
    let _head = buf.split_to(1000);
    pool.release(buf);

    assert_eq!(pool.metrics().drops.load(Ordering::Relaxed), 1);
    assert_eq!(pool.available(), 1);
}

#[test]
fn test_concurrent_acquire_release() {
    use std::sync::Arc;
    use std::thread;

    let pool = Arc::new(BufferPool::new(16, 256));
    let mut handles = vec![];

    for _ in 0..4 {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                let buf = pool.acquire();
                pool.release(buf);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(pool.available(), 16);
}
