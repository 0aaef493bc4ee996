//! The producer task: owns the transport, stamps each line with its
//! receive time, and hands it to the consumer via the drop-head queue.
//! Reconnects with backoff on a fatal transport error; never exits on
//! its own account (spec §7) — only a cancellation signal stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Notify;
use tracing::warn;

use crate::config::Config;
use crate::health::HealthState;
use crate::queue::DropHeadQueue;
use crate::transport::{open_with_backoff, AsyncLineSource, RawRead};

/// A line plus the wall-clock time it was received, as it flows from
/// producer to consumer.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub received_at_ms: i64,
    pub raw: RawRead,
}

pub fn now_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

/// Runs until `cancelled` is observed true. `source` is replaced in place
/// via `open_with_backoff` whenever a read comes back fatal.
///
/// Cancellation is only checked between reads, never raced against an
/// in-flight one (spec §5: "producer finishes its current read, pushes,
/// and exits") — `source.read_line` is itself bounded by `timeout`, so a
/// pending read surfaces `Ok(None)` on its own rather than needing to be
/// aborted. `_cancel` is accepted only for signature symmetry with
/// `run_consumer`; the producer never blocks anywhere a wakeup would help.
pub async fn run_producer(
    mut source: Box<dyn AsyncLineSource>,
    config: Config,
    queue: Arc<DropHeadQueue<QueueItem>>,
    health: Arc<HealthState>,
    _cancel: Arc<Notify>,
    cancelled: Arc<AtomicBool>,
) {
    let timeout = config.read_timeout();
    loop {
        if cancelled.load(Ordering::Relaxed) {
            return;
        }

        match source.read_line(timeout).await {
            Ok(Some(raw)) => {
                let received_at_ms = now_ms();
                health.mark_producer_alive(received_at_ms);
                queue.push(QueueItem { received_at_ms, raw }).await;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("transport read failed: {e}, reconnecting");
                source = Box::new(open_with_backoff(&config).await);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FixtureLineSource;
    use std::time::Duration;

    #[tokio::test]
    async fn drains_fixture_lines_into_the_queue_then_idles() {
        let source: Box<dyn AsyncLineSource> = Box::new(FixtureLineSource::new(vec![b"a".to_vec(), b"b".to_vec()]));
        let queue = Arc::new(DropHeadQueue::new(10));
        let health = HealthState::new();
        let cancel = Arc::new(Notify::new());
        let cancelled = Arc::new(AtomicBool::new(false));

        let config = Config { read_timeout_ms: 5, ..Config::default() };

        let task_queue = queue.clone();
        let task_health = health.clone();
        let task_cancel = cancel.clone();
        let task_cancelled = cancelled.clone();
        let handle = tokio::spawn(run_producer(source, config, task_queue, task_health, task_cancel, task_cancelled));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancelled.store(true, Ordering::Relaxed);
        cancel.notify_one();
        handle.await.unwrap();

        let drained = queue.drain().await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].raw.bytes, b"a");
        assert!(health.snapshot(0, 0).producer_heartbeat > 0);
    }
}
