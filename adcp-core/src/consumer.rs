//! The consumer task: the sole owner of the store connection and the
//! file-exporter handles. Pops queued lines, runs them through the
//! binary-mode detector and then the NMEA framer/router, and persists
//! the result — batching commits by size or time, whichever comes
//! first (spec §4.9).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use tokio::sync::Notify;
use tracing::{info, warn};

use nmea_proto::record::{LatchedConfig, ParsedRecord};
use nmea_proto::{route_with_options, ErrorKind, ParseError};

use crate::binary::{BinaryModeDetector, IngestOutcome};
use crate::config::Config;
use crate::error::CoreError;
use crate::exporter::Exporter;
use crate::health::HealthState;
use crate::producer::QueueItem;
use crate::queue::DropHeadQueue;
use crate::store::{BatchItem, Disposition, Outcome, Store};

/// The directory segment `Exporter::append` is given for the optional
/// textual mirror of `parse_errors` (spec §6: `errors/nmea/{date}.txt`),
/// derived from `config.nmea_error_log_dir()` the same way
/// `process_chunk` derives the binary-blob directory from
/// `config.binary_blob_dir()`. A multi-segment prefix works because
/// `Exporter` just joins it onto `output_dir` as a path.
fn nmea_mirror_prefix(config: &Config) -> String {
    config
        .nmea_error_log_dir()
        .strip_prefix(&config.output_dir)
        .unwrap_or(std::path::Path::new("errors/nmea"))
        .to_string_lossy()
        .into_owned()
}

/// `{YYYYMMDD}_{HHMMSS}_bin_{NNN}.dat`, spec §6/§4.8. `seq` disambiguates
/// multiple blobs finalized within the same wall-clock second (size-cap
/// rollovers in particular can do this under heavy noise).
fn binary_blob_file_name(received_at_ms: i64, seq: u32) -> String {
    let dt = chrono::Utc.timestamp_millis_opt(received_at_ms).single().unwrap_or_else(chrono::Utc::now);
    format!("{}_bin_{seq:03}.dat", dt.format("%Y%m%d_%H%M%S"))
}

fn write_binary_blob(dir: &std::path::Path, received_at_ms: i64, seq: u32, blob: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(binary_blob_file_name(received_at_ms, seq));
    std::fs::write(path, blob)
}

/// Turns one resolved ASCII chunk into the batch row(s) for it, updating
/// the latched `PNORI` snapshot as a side effect when a line is a fresh
/// config record. Framing never relies on line terminators (spec §4.1),
/// so a chunk with no intervening CR/LF can still hold more than one
/// `$...*HH` frame back to back — this loops via `frame_one` until the
/// chunk is exhausted instead of assuming one chunk is exactly one frame,
/// so every frame gets its own row (spec §8 invariant 1).
#[allow(clippy::too_many_arguments)]
fn handle_ascii_line(
    received_at_ms: i64,
    bytes: Vec<u8>,
    truncated: bool,
    latched: &mut Option<LatchedConfig>,
    options: nmea_proto::ParserOptions,
    mirror_prefix: &str,
    batch: &mut Vec<BatchItem>,
    export: &mut Vec<(String, i64, String)>,
) {
    let mut remaining: &[u8] = &bytes;
    while !remaining.is_empty() {
        let (attempt, consumed) = nmea_proto::frame_one(remaining, truncated);
        let segment = remaining[..consumed].to_vec();
        remaining = &remaining[consumed..];

        let frame = match attempt {
            Ok(frame) => frame,
            Err(err) => {
                let line_text = String::from_utf8_lossy(&segment).into_owned();
                export.push((mirror_prefix.to_string(), received_at_ms, format!("{}\t{line_text}", err.kind.code())));
                batch.push(BatchItem {
                    received_at_ms,
                    raw_bytes: segment,
                    outcome: Outcome::Fail,
                    prefix: err.attempted_prefix.clone(),
                    checksum_valid: false,
                    error_message: Some(err.kind.to_string()),
                    disposition: Disposition::Error(err),
                });
                continue;
            }
        };

        match route_with_options(&frame, latched.as_ref(), options) {
            Ok(record) => {
                if let ParsedRecord::Pnori(p) = &record {
                    *latched = Some(LatchedConfig::from(p));
                }
                let family = record.family().to_ascii_uppercase();
                let line_text = String::from_utf8_lossy(&segment).into_owned();
                export.push((family.clone(), received_at_ms, line_text));
                batch.push(BatchItem {
                    received_at_ms,
                    raw_bytes: frame.to_wire(),
                    outcome: Outcome::Ok,
                    prefix: Some(family),
                    checksum_valid: true,
                    error_message: None,
                    disposition: Disposition::Parsed(record),
                });
            }
            Err(err) => {
                let line_text = String::from_utf8_lossy(&segment).into_owned();
                export.push((mirror_prefix.to_string(), received_at_ms, format!("{}\t{line_text}", err.kind.code())));
                batch.push(BatchItem {
                    received_at_ms,
                    raw_bytes: frame.to_wire(),
                    outcome: Outcome::Fail,
                    prefix: err.attempted_prefix.clone(),
                    checksum_valid: true,
                    error_message: Some(err.kind.to_string()),
                    disposition: Disposition::Error(err),
                });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn process_chunk(
    received_at_ms: i64,
    bytes: Vec<u8>,
    truncated: bool,
    detector: &mut BinaryModeDetector,
    latched: &mut Option<LatchedConfig>,
    options: nmea_proto::ParserOptions,
    config: &Config,
    health: &HealthState,
    blob_seq: &mut u32,
    batch: &mut Vec<BatchItem>,
    export: &mut Vec<(String, i64, String)>,
) {
    let mirror_prefix = nmea_mirror_prefix(config);
    match detector.ingest(&bytes) {
        IngestOutcome::Passthrough(line) => {
            handle_ascii_line(received_at_ms, line, truncated, latched, options, &mirror_prefix, batch, export);
        }
        IngestOutcome::EnteredBinary => {
            health.set_binary_mode(true);
            export.push((mirror_prefix.clone(), received_at_ms, "BINARY_MODE_ENTRY".to_string()));
            batch.push(BatchItem {
                received_at_ms,
                raw_bytes: bytes,
                outcome: Outcome::Binary,
                prefix: None,
                checksum_valid: false,
                error_message: Some("entered binary-capture mode".into()),
                disposition: Disposition::Error(ParseError::new(ErrorKind::BinaryModeEntry)),
            });
        }
        IngestOutcome::StillBinary => {}
        IngestOutcome::BlobRollover(blob) => {
            if let Err(e) = write_binary_blob(&config.binary_blob_dir(), received_at_ms, *blob_seq, &blob) {
                warn!("failed to write binary blob rollover: {e}");
            }
            *blob_seq += 1;
        }
        IngestOutcome::ExitedBinary { blob, resume } => {
            if let Err(e) = write_binary_blob(&config.binary_blob_dir(), received_at_ms, *blob_seq, &blob) {
                warn!("failed to write binary blob on resync: {e}");
            }
            *blob_seq += 1;
            health.set_binary_mode(false);
            export.push((mirror_prefix.clone(), received_at_ms, "BINARY_MODE_EXIT".to_string()));
            batch.push(BatchItem {
                received_at_ms,
                raw_bytes: blob,
                outcome: Outcome::Binary,
                prefix: None,
                checksum_valid: false,
                error_message: Some("exited binary-capture mode".into()),
                disposition: Disposition::Error(ParseError::new(ErrorKind::BinaryModeExit)),
            });
            handle_ascii_line(received_at_ms, resume, false, latched, options, &mirror_prefix, batch, export);
        }
    }
}

/// Runs one commit on the blocking threadpool (rusqlite is synchronous)
/// and races it against `timeout`, twice. A single pass that misses the
/// deadline is logged and given one more full `timeout` window; a second
/// miss is a `STORE_WRITE` fatal event per spec §7 — the consumer keeps
/// running regardless and picks the store back up once the task settles.
async fn commit_with_retry(
    mut store: Store,
    items: Vec<BatchItem>,
    timeout: Duration,
    health: &HealthState,
) -> (Store, Result<(), CoreError>) {
    let handle = tokio::task::spawn_blocking(move || {
        let result = store.write_batch(&items);
        (store, result)
    });
    tokio::pin!(handle);

    if tokio::time::timeout(timeout, &mut handle).await.is_err() {
        warn!("store commit exceeded {timeout:?}, retrying once before a fatal event");
        if tokio::time::timeout(timeout, &mut handle).await.is_err() {
            warn!("store commit still outstanding after the retry window");
            health.record_fatal(crate::error::HealthEvent::StoreWriteFailed {
                detail: format!("commit exceeded {timeout:?} twice"),
            });
        }
    }

    (&mut handle).await.expect("store commit task panicked")
}

async fn flush_batch(
    store_slot: &mut Option<Store>,
    exporter: &mut Exporter,
    batch: &mut Vec<BatchItem>,
    export: &mut Vec<(String, i64, String)>,
    commit_timeout: Duration,
    health: &HealthState,
) -> Result<(), CoreError> {
    if !batch.is_empty() {
        let store = store_slot.take().expect("store is always present between flushes");
        let items = std::mem::take(batch);
        let (store, result) = commit_with_retry(store, items, commit_timeout, health).await;
        *store_slot = Some(store);
        result?;
    }
    for (family, received_at_ms, line) in export.drain(..) {
        exporter.append(&family, received_at_ms, &line).await?;
    }
    exporter.flush_all().await?;
    Ok(())
}

/// Runs until cancellation is observed and the queue is drained. Commits
/// whenever `batch.len() >= config.batch_size` or `batch_interval_ms`
/// has elapsed since the last commit, whichever comes first.
pub async fn run_consumer(
    queue: Arc<DropHeadQueue<QueueItem>>,
    store: Store,
    mut exporter: Exporter,
    health: Arc<HealthState>,
    config: Config,
    cancel: Arc<Notify>,
    cancelled: Arc<AtomicBool>,
) {
    let mut detector = BinaryModeDetector::new(config.max_non_nmea_per_line, config.binary_blob_max_bytes);
    let mut latched: Option<LatchedConfig> = None;
    let options = config.parser_options();
    let mut batch: Vec<BatchItem> = Vec::with_capacity(config.batch_size);
    let mut export: Vec<(String, i64, String)> = Vec::new();
    let mut store_slot = Some(store);
    let commit_timeout = config.store_commit_timeout();
    let mut last_flush = tokio::time::Instant::now();
    let mut blob_seq: u32 = 0;
    let pop_timeout = Duration::from_millis(200);

    loop {
        let item = queue.pop(pop_timeout).await;

        if let Some(item) = item {
            health.mark_consumer_alive(crate::producer::now_ms());
            process_chunk(
                item.received_at_ms,
                item.raw.bytes,
                item.raw.truncated,
                &mut detector,
                &mut latched,
                options,
                &config,
                &health,
                &mut blob_seq,
                &mut batch,
                &mut export,
            );
        }

        let due = batch.len() >= config.batch_size || last_flush.elapsed() >= config.batch_interval();
        if due && (!batch.is_empty() || !export.is_empty()) {
            if let Err(e) = flush_batch(&mut store_slot, &mut exporter, &mut batch, &mut export, commit_timeout, &health).await {
                warn!("batch commit failed: {e}");
            }
            last_flush = tokio::time::Instant::now();
        }

        if cancelled.load(Ordering::Relaxed) && queue.depth() == 0 {
            break;
        }
    }

    for leftover in queue.drain().await {
        process_chunk(
            leftover.received_at_ms,
            leftover.raw.bytes,
            leftover.raw.truncated,
            &mut detector,
            &mut latched,
            options,
            &config,
            &health,
            &mut blob_seq,
            &mut batch,
            &mut export,
        );
    }
    if let Err(e) = flush_batch(&mut store_slot, &mut exporter, &mut batch, &mut export, commit_timeout, &health).await {
        warn!("final shutdown commit failed: {e}");
    }
    info!("consumer drained and flushed on shutdown");
    cancel.notify_waiters();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::QueueItem;
    use crate::transport::RawRead;
    use chrono::TimeZone;

    fn item(bytes: &[u8]) -> QueueItem {
        QueueItem { received_at_ms: 1_700_000_000_000, raw: RawRead { bytes: bytes.to_vec(), truncated: false } }
    }

    #[tokio::test]
    async fn processes_a_valid_sentence_into_the_store_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("store.db")).unwrap();
        let exporter = Exporter::new(dir.path().to_path_buf(), chrono_tz::UTC);
        let queue = Arc::new(DropHeadQueue::new(10));
        let health = HealthState::new();
        let cancel = Arc::new(Notify::new());
        let cancelled = Arc::new(AtomicBool::new(false));

        let cs = nmea_proto::checksum::checksum(b"PNORWD,1.0,2.0,3.0,4.0");
        let hex = nmea_proto::checksum::format_checksum(cs);
        let mut line = b"$PNORWD,1.0,2.0,3.0,4.0*".to_vec();
        line.extend_from_slice(&hex);
        queue.push(item(&line)).await;

        let config = Config { batch_size: 1, batch_interval_ms: 10, output_dir: dir.path().to_path_buf(), ..Config::default() };

        let task_queue = queue.clone();
        let task_cancel = cancel.clone();
        let task_cancelled = cancelled.clone();
        let task_health = health.clone();
        let handle = tokio::spawn(run_consumer(task_queue, store, exporter, task_health, config, task_cancel, task_cancelled));

        tokio::time::sleep(Duration::from_millis(60)).await;
        cancelled.store(true, Ordering::Relaxed);
        handle.await.unwrap();

        let verify = Store::open(&dir.path().join("store.db")).unwrap();
        let count: i64 = verify.conn_for_test().query_row("SELECT COUNT(*) FROM pnorwd", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);

        let exported = std::fs::read_to_string(dir.path().join("PNORWD").join(
            chrono::Utc.timestamp_millis_opt(1_700_000_000_000).unwrap().format("%Y-%m-%d").to_string() + ".txt",
        ));
        assert!(exported.is_ok());
    }
}
