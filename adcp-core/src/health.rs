//! The `health()` control-plane contract: a point-in-time snapshot an
//! external supervisor polls instead of the core ever exiting on its own
//! account (spec §7).

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::HealthEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Ascii,
    Binary,
}

/// Serializable so an external supervisor can poll `health()` over
/// whatever control surface it's wired to (stdout line, HTTP handler,
/// metrics exporter) without adcp-core needing to know which.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    /// Unix millis of the producer's last successful read, or 0 if none yet.
    pub producer_heartbeat: i64,
    /// Unix millis of the consumer's last processed item, or 0 if none yet.
    pub consumer_heartbeat: i64,
    pub queue_depth: usize,
    pub dropped_frames: u64,
    pub mode: Mode,
    /// The most recent unrecoverable condition (store write failed after
    /// retry, transport stuck, filesystem fatal). The core keeps running
    /// regardless (spec §7) — this is purely informational for whatever
    /// supervises it.
    pub last_fatal: Option<String>,
}

/// Shared, lock-free counters the producer and consumer tasks update as
/// they run; `Core::health()` reads a consistent-enough snapshot from
/// these without synchronizing with either task. Queue depth and dropped
/// frames are read straight from the `DropHeadQueue`'s own atomics
/// rather than mirrored here.
#[derive(Debug)]
pub struct HealthState {
    producer_heartbeat_ms: AtomicI64,
    consumer_heartbeat_ms: AtomicI64,
    binary_mode: std::sync::atomic::AtomicBool,
    last_fatal: Mutex<Option<HealthEvent>>,
}

impl HealthState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            producer_heartbeat_ms: AtomicI64::new(0),
            consumer_heartbeat_ms: AtomicI64::new(0),
            binary_mode: std::sync::atomic::AtomicBool::new(false),
            last_fatal: Mutex::new(None),
        })
    }

    /// Records a fatal event for the next `health()` poll to observe.
    /// Never interrupts the caller's loop — see spec §7.
    pub fn record_fatal(&self, event: HealthEvent) {
        *self.last_fatal.lock().unwrap() = Some(event);
    }

    pub fn mark_producer_alive(&self, now_ms: i64) {
        self.producer_heartbeat_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn mark_consumer_alive(&self, now_ms: i64) {
        self.consumer_heartbeat_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn set_binary_mode(&self, binary: bool) {
        self.binary_mode.store(binary, Ordering::Relaxed);
    }

    pub fn snapshot(&self, queue_depth: usize, dropped_frames: u64) -> HealthSnapshot {
        HealthSnapshot {
            producer_heartbeat: self.producer_heartbeat_ms.load(Ordering::Relaxed),
            consumer_heartbeat: self.consumer_heartbeat_ms.load(Ordering::Relaxed),
            queue_depth,
            dropped_frames,
            mode: if self.binary_mode.load(Ordering::Relaxed) { Mode::Binary } else { Mode::Ascii },
            last_fatal: self.last_fatal.lock().unwrap().as_ref().map(ToString::to_string),
        }
    }
}
