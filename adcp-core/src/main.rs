use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use adcp_core::config::{Config, LogLevel};
use adcp_core::Core;

/// ADCP/NMEA-0183 serial telemetry ingest pipeline: reads sentences off a
/// serial port, persists them to an embedded store and daily per-family
/// log files, and falls back to raw-byte capture when the line goes
/// binary. See `health()` (exposed over the library API) for the
/// liveness contract an external supervisor should poll instead of
/// expecting this process to exit on its own.
#[derive(Parser, Debug)]
#[command(name = "adcp-core", version, about)]
struct Args {
    /// Serial device path.
    #[arg(long, default_value = "/dev/ttyUSB0")]
    serial_port: String,

    #[arg(long, default_value_t = 9600)]
    baud_rate: u32,

    #[arg(long, default_value_t = 1000)]
    read_timeout_ms: u64,

    /// Root directory for the store file, daily logs, and error blobs.
    #[arg(long, default_value = "./adcp-data")]
    output_dir: PathBuf,

    #[arg(long, default_value_t = 1000)]
    queue_capacity: usize,

    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    #[arg(long, default_value_t = 500)]
    batch_interval_ms: u64,

    #[arg(long, default_value_t = 10)]
    max_non_nmea_per_line: usize,

    #[arg(long, default_value_t = 10_485_760)]
    binary_blob_max_bytes: u64,

    #[arg(long, default_value_t = 1.0)]
    reconnect_base_s: f64,

    #[arg(long, default_value_t = 60.0)]
    reconnect_cap_s: f64,

    /// IANA timezone name used for the file exporter's midnight rollover.
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// `PNORI.num_cells` upper bound (spec §9 Open Question (a)).
    #[arg(long, default_value_t = 1000)]
    max_cells: u16,

    #[arg(long, default_value_t = 2)]
    cancel_deadline_s: u64,

    /// Hard timeout on a single store commit before it's retried once,
    /// then surfaced as a fatal health event.
    #[arg(long, default_value_t = 10_000)]
    store_commit_timeout_ms: u64,

    /// Fallback log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> anyhow::Result<Config> {
        let timezone: chrono_tz::Tz = self
            .timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("unrecognized IANA timezone {:?}", self.timezone))?;

        let log_level = match self.log_level.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        };

        Ok(Config {
            serial_port: self.serial_port,
            baud_rate: self.baud_rate,
            read_timeout_ms: self.read_timeout_ms,
            output_dir: self.output_dir,
            queue_capacity: self.queue_capacity,
            batch_size: self.batch_size,
            batch_interval_ms: self.batch_interval_ms,
            max_non_nmea_per_line: self.max_non_nmea_per_line,
            binary_blob_max_bytes: self.binary_blob_max_bytes,
            reconnect_base_s: self.reconnect_base_s,
            reconnect_cap_s: self.reconnect_cap_s,
            timezone,
            cancel_deadline: std::time::Duration::from_secs(self.cancel_deadline_s),
            max_cells: self.max_cells,
            store_commit_timeout_ms: self.store_commit_timeout_ms,
            log_level,
            ..Config::default()
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.into_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("adcp_core={}", config.log_level.as_filter_str()).into()),
        )
        .init();

    info!("starting adcp-core on {} @ {} baud, output dir {}", config.serial_port, config.baud_rate, config.output_dir.display());

    let mut core = Core::new(config);
    core.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining queue and flushing store...");
    core.stop().await;
    info!("shutdown complete");

    Ok(())
}
