//! Library surface for the ADCP/NMEA telemetry ingest pipeline: a single
//! producer task reading the serial transport, a single consumer task
//! owning the embedded store and file exporter, connected by a bounded
//! drop-head queue. `Core` is the control-plane handle `main.rs` (or any
//! other embedder) drives.

pub mod binary;
pub mod config;
pub mod consumer;
pub mod error;
pub mod exporter;
pub mod health;
pub mod producer;
pub mod queue;
pub mod store;
pub mod transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use config::Config;
pub use error::CoreError;
pub use health::{HealthSnapshot, Mode};

use consumer::run_consumer;
use exporter::Exporter;
use health::HealthState;
use producer::{run_producer, QueueItem};
use queue::DropHeadQueue;
use store::Store;
use transport::{open_with_backoff, AsyncLineSource};

/// Owns the producer and consumer tasks and the queue between them.
/// Never exits on its own account (spec §7) — callers observe liveness
/// through [`Core::health`] and decide for themselves whether to restart.
pub struct Core {
    config: Config,
    queue: Arc<DropHeadQueue<QueueItem>>,
    health: Arc<HealthState>,
    cancel: Arc<Notify>,
    cancelled: Arc<AtomicBool>,
    producer_handle: Option<JoinHandle<()>>,
    consumer_handle: Option<JoinHandle<()>>,
}

impl Core {
    pub fn new(config: Config) -> Self {
        Self {
            queue: Arc::new(DropHeadQueue::new(config.queue_capacity)),
            health: HealthState::new(),
            cancel: Arc::new(Notify::new()),
            cancelled: Arc::new(AtomicBool::new(false)),
            producer_handle: None,
            consumer_handle: None,
            config,
        }
    }

    /// Opens the store and file exporter under `config.output_dir`, opens
    /// the serial transport (retrying with backoff if the device isn't
    /// there yet), and spawns the producer and consumer tasks.
    pub async fn start(&mut self) -> Result<(), CoreError> {
        info!("opening serial transport {}", self.config.serial_port);
        let source: Box<dyn AsyncLineSource> = Box::new(open_with_backoff(&self.config).await);
        self.start_with_source(source).await
    }

    /// Like [`Core::start`], but with an explicit transport — the seam
    /// tests use to drive the pipeline against a [`transport::FixtureLineSource`]
    /// instead of real hardware.
    pub async fn start_with_source(&mut self, source: Box<dyn AsyncLineSource>) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let store = Store::open(&self.config.store_path())?;
        let exporter = Exporter::new(self.config.output_dir.clone(), self.config.timezone);

        self.cancelled.store(false, Ordering::Relaxed);

        let producer_task = tokio::spawn(run_producer(
            source,
            self.config.clone(),
            self.queue.clone(),
            self.health.clone(),
            self.cancel.clone(),
            self.cancelled.clone(),
        ));
        let consumer_task = tokio::spawn(run_consumer(
            self.queue.clone(),
            store,
            exporter,
            self.health.clone(),
            self.config.clone(),
            self.cancel.clone(),
            self.cancelled.clone(),
        ));

        self.producer_handle = Some(producer_task);
        self.consumer_handle = Some(consumer_task);
        Ok(())
    }

    /// Signals cancellation and waits up to `config.cancel_deadline` for
    /// each task to drain and exit. A task that overruns the deadline is
    /// left to finish on its own; its `JoinHandle` is dropped rather than
    /// aborted so an in-flight store commit isn't cut off mid-write.
    pub async fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.cancel.notify_waiters();

        let deadline = self.config.cancel_deadline;
        if let Some(handle) = self.producer_handle.take() {
            if tokio::time::timeout(deadline, handle).await.is_err() {
                warn!("producer task did not exit within cancel_deadline");
            }
        }
        if let Some(handle) = self.consumer_handle.take() {
            if tokio::time::timeout(deadline, handle).await.is_err() {
                warn!("consumer task did not exit within cancel_deadline");
            }
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        self.health.snapshot(self.queue.depth(), self.queue.dropped())
    }
}
