//! Runtime configuration for the ingest pipeline.
//!
//! Loading a config file, environment overlays, and CLI flags are the
//! external control surface's job (see `main.rs`); this struct is just the
//! resolved, validated set of knobs `Core` is built from.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct Config {
    /// Serial device path, e.g. `/dev/ttyUSB0`.
    pub serial_port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Root directory for the store file, daily logs, and error blobs.
    pub output_dir: PathBuf,
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub batch_interval_ms: u64,
    pub max_non_nmea_per_line: usize,
    pub binary_blob_max_bytes: u64,
    pub reconnect_base_s: f64,
    pub reconnect_cap_s: f64,
    pub log_level: LogLevel,
    /// Timezone used for the file exporter's midnight rollover and the
    /// `{YYYY-MM-DD}` directory naming. Defaults to UTC.
    pub timezone: Tz,
    /// How long the consumer waits to drain the queue on shutdown.
    pub cancel_deadline: Duration,
    /// `PNORI.num_cells` upper bound (§9 Open Question (a)).
    pub max_cells: u16,
    /// Hard timeout on a single store commit before it's retried once,
    /// then surfaced as a fatal health event (spec §5, §7 `STORE_WRITE`).
    pub store_commit_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 1000,
            output_dir: PathBuf::from("./adcp-data"),
            queue_capacity: 1000,
            batch_size: 100,
            batch_interval_ms: 500,
            max_non_nmea_per_line: 10,
            binary_blob_max_bytes: 10_485_760,
            reconnect_base_s: 1.0,
            reconnect_cap_s: 60.0,
            log_level: LogLevel::Info,
            timezone: chrono_tz::UTC,
            cancel_deadline: Duration::from_secs(2),
            max_cells: 1000,
            store_commit_timeout_ms: 10_000,
        }
    }
}

impl Config {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn store_commit_timeout(&self) -> Duration {
        Duration::from_millis(self.store_commit_timeout_ms)
    }

    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    pub fn store_path(&self) -> PathBuf {
        self.output_dir.join("store.db")
    }

    pub fn binary_blob_dir(&self) -> PathBuf {
        self.output_dir.join("errors").join("binary")
    }

    pub fn nmea_error_log_dir(&self) -> PathBuf {
        self.output_dir.join("errors").join("nmea")
    }

    pub fn parser_options(&self) -> nmea_proto::ParserOptions {
        nmea_proto::ParserOptions { max_cells: self.max_cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let c = Config::default();
        assert_eq!(c.baud_rate, 9600);
        assert_eq!(c.queue_capacity, 1000);
        assert_eq!(c.batch_size, 100);
        assert_eq!(c.batch_interval_ms, 500);
        assert_eq!(c.max_non_nmea_per_line, 10);
        assert_eq!(c.binary_blob_max_bytes, 10_485_760);
        assert_eq!(c.timezone, chrono_tz::UTC);
    }

    #[test]
    fn derived_paths_nest_under_output_dir() {
        let c = Config { output_dir: PathBuf::from("/tmp/adcp"), ..Config::default() };
        assert_eq!(c.store_path(), PathBuf::from("/tmp/adcp/store.db"));
        assert_eq!(c.binary_blob_dir(), PathBuf::from("/tmp/adcp/errors/binary"));
        assert_eq!(c.nmea_error_log_dir(), PathBuf::from("/tmp/adcp/errors/nmea"));
    }
}
