//! A bounded single-producer/single-consumer queue with drop-head
//! (discard-oldest) backpressure.
//!
//! A generic `mpsc` channel has no discard-oldest semantics, so this is a
//! small purpose-built ring buffer instead: `len` is an `AtomicUsize` so
//! the health probe can read queue depth without taking the lock, and
//! `dropped` is an `AtomicU64` counter of frames evicted to make room.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

pub struct DropHeadQueue<T> {
    inner: Mutex<VecDeque<T>>,
    notify: Notify,
    len: AtomicUsize,
    dropped: AtomicU64,
    capacity: usize,
}

impl<T> DropHeadQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            len: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
            capacity,
        }
    }

    /// Pushes an item, discarding the oldest queued item if already at
    /// capacity. Never blocks.
    pub async fn push(&self, item: T) {
        let mut guard = self.inner.lock().await;
        if guard.len() >= self.capacity {
            guard.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(item);
        self.len.store(guard.len(), Ordering::Relaxed);
        drop(guard);
        self.notify.notify_one();
    }

    /// Pops the oldest item, waiting up to `timeout` for one to arrive.
    /// Returns `None` on timeout (not an error — the consumer loop just
    /// checks for cancellation and tries again).
    pub async fn pop(&self, timeout: Duration) -> Option<T> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            {
                let mut guard = self.inner.lock().await;
                if let Some(item) = guard.pop_front() {
                    self.len.store(guard.len(), Ordering::Relaxed);
                    return Some(item);
                }
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let notified = self.notify.notified();
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return None;
            }
        }
    }

    /// Drains every currently queued item, for shutdown flush.
    pub async fn drain(&self) -> Vec<T> {
        let mut guard = self.inner.lock().await;
        let items = guard.drain(..).collect();
        self.len.store(0, Ordering::Relaxed);
        items
    }

    /// Current queue depth, read without locking.
    pub fn depth(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Total number of items evicted by drop-head since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
