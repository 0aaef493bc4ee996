//! Serial transport with exponential-backoff reconnection, abstracted
//! behind [`AsyncLineSource`] so the producer can run against either the
//! real `tokio-serial` port or an in-memory fixture (unit tests, and
//! `nmea-sim`'s PTY/TCP outputs during manual exercise of the pipeline).

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio_serial::SerialPortBuilderExt;
use tracing::{info, warn};

use crate::config::Config;

/// One line read from the transport: up to one frame's worth of bytes,
/// capped at `nmea_proto::MAX_FRAME_LEN`. `truncated` is set when the cap
/// was hit without finding a terminator, so the framer can tell an
/// oversized frame apart from one that's merely missing its `*HH`.
#[derive(Debug, Clone)]
pub struct RawRead {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

/// Abstracts "read the next chunk of bytes from the wire" so the producer
/// is testable without real hardware. Implementors own their connection
/// state; `read_line` returns `Ok(None)` on a read timeout (not an
/// error — see spec §4.5) and `Err` on a fatal I/O condition that should
/// trigger a reconnect.
#[async_trait::async_trait]
pub trait AsyncLineSource: Send {
    async fn read_line(&mut self, timeout: Duration) -> std::io::Result<Option<RawRead>>;
}

/// The production transport: a `tokio-serial` port read line-by-line (CR
/// or LF terminated), falling back to a truncated read at
/// `nmea_proto::MAX_FRAME_LEN` bytes if no terminator shows up in time.
pub struct SerialLineSource {
    port: tokio_serial::SerialStream,
    buf: Vec<u8>,
}

impl SerialLineSource {
    pub fn open(config: &Config) -> std::io::Result<Self> {
        let port = tokio_serial::new(&config.serial_port, config.baud_rate)
            .timeout(config.read_timeout())
            .open_native_async()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        Ok(Self { port, buf: Vec::with_capacity(nmea_proto::MAX_FRAME_LEN) })
    }
}

#[async_trait::async_trait]
impl AsyncLineSource for SerialLineSource {
    async fn read_line(&mut self, timeout: Duration) -> std::io::Result<Option<RawRead>> {
        self.buf.clear();
        let mut byte = [0u8; 1];
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let read = tokio::time::timeout(remaining, self.port.read_exact(&mut byte)).await;
            let n = match read {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(None),
            };
            if n == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "serial port closed"));
            }
            if byte[0] == b'\n' {
                return Ok(Some(RawRead { bytes: std::mem::take(&mut self.buf), truncated: false }));
            }
            if byte[0] != b'\r' {
                self.buf.push(byte[0]);
            }
            if self.buf.len() >= nmea_proto::MAX_FRAME_LEN {
                return Ok(Some(RawRead { bytes: std::mem::take(&mut self.buf), truncated: true }));
            }
        }
    }
}

/// Attempts to (re)open the serial transport, retrying forever with
/// `min(base * 2^attempt, cap)` second backoff between attempts. Resets
/// to `attempt = 0` on success; the caller is responsible for resetting
/// again after a subsequent successful read (a clean open doesn't
/// guarantee the line stays good).
pub async fn open_with_backoff(config: &Config) -> SerialLineSource {
    let mut attempt: u32 = 0;
    loop {
        match SerialLineSource::open(config) {
            Ok(source) => {
                info!("serial port {} opened", config.serial_port);
                return source;
            }
            Err(e) => {
                let delay = backoff_delay(config.reconnect_base_s, config.reconnect_cap_s, attempt);
                warn!(
                    "failed to open serial port {} (attempt {attempt}): {e}, retrying in {delay:.1}s",
                    config.serial_port
                );
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

pub fn backoff_delay(base_s: f64, cap_s: f64, attempt: u32) -> f64 {
    let scaled = base_s * 2f64.powi(attempt as i32);
    scaled.min(cap_s)
}

/// An in-memory fixture implementing [`AsyncLineSource`] for tests: reads
/// lines from a pre-loaded queue, yielding `Ok(None)` (a timeout) once
/// exhausted rather than an error, so a consumer loop testing shutdown
/// behavior doesn't spuriously see a fatal transport error.
pub struct FixtureLineSource {
    lines: std::collections::VecDeque<RawRead>,
}

impl FixtureLineSource {
    pub fn new(lines: Vec<Vec<u8>>) -> Self {
        Self { lines: lines.into_iter().map(|bytes| RawRead { bytes, truncated: false }).collect() }
    }
}

#[async_trait::async_trait]
impl AsyncLineSource for FixtureLineSource {
    async fn read_line(&mut self, _timeout: Duration) -> std::io::Result<Option<RawRead>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        assert_eq!(backoff_delay(1.0, 60.0, 0), 1.0);
        assert_eq!(backoff_delay(1.0, 60.0, 1), 2.0);
        assert_eq!(backoff_delay(1.0, 60.0, 6), 64f64.min(60.0));
        assert_eq!(backoff_delay(1.0, 60.0, 10), 60.0);
    }

    #[tokio::test]
    async fn fixture_source_yields_queued_lines_then_none() {
        let mut src = FixtureLineSource::new(vec![b"hello".to_vec()]);
        let first = src.read_line(Duration::from_millis(10)).await.unwrap();
        assert_eq!(first.unwrap().bytes, b"hello");
        let second = src.read_line(Duration::from_millis(10)).await.unwrap();
        assert!(second.is_none());
    }
}
