mod corrupt;
mod generator;
mod sink;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use corrupt::{binary_noise_burst, corrupt_checksum};
use generator::{FleetConfig, TelemetryGenerator};
use sink::{Sink, SinkTarget};

/// Synthetic ADCP telemetry generator: emits the same sentence families
/// `adcp-core` ingests, at a configurable rate, optionally injecting
/// checksum corruption and binary-noise bursts to exercise the
/// consumer's error paths without real hardware attached.
#[derive(Parser, Debug)]
#[command(name = "nmea-sim", version, about)]
struct Args {
    /// Write generated sentences to this file instead of stdout.
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Write generated sentences to this `host:port` TCP address instead
    /// of stdout.
    #[arg(long, conflicts_with = "output_file")]
    tcp_addr: Option<String>,

    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    #[arg(long, default_value_t = 20)]
    num_cells: u16,

    /// Stop after emitting this many bursts; runs forever if unset.
    #[arg(long)]
    burst_count: Option<u64>,

    /// Fraction of sentences, in `[0, 1]`, that get their checksum flipped.
    #[arg(long, default_value_t = 0.0)]
    checksum_corruption_rate: f64,

    /// Probability per burst, in `[0, 1]`, of interleaving a 200-byte
    /// binary-noise burst ahead of the burst's sentences.
    #[arg(long, default_value_t = 0.0)]
    binary_noise_rate: f64,

    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl Args {
    fn sink_target(&self) -> SinkTarget {
        if let Some(path) = &self.output_file {
            SinkTarget::File(path.clone())
        } else if let Some(addr) = &self.tcp_addr {
            SinkTarget::Tcp(addr.clone())
        } else {
            SinkTarget::Stdout
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).init();

    let args = Args::parse();
    let mut sink = Sink::open(&args.sink_target()).await?;
    let mut rng = {
        use rand::SeedableRng;
        rand::rngs::StdRng::seed_from_u64(args.seed)
    };

    let config = FleetConfig { num_cells: args.num_cells, ..FleetConfig::default() };
    let mut generator = TelemetryGenerator::new(config, args.seed);

    info!("emitting PNORI boot sentence");
    emit(&mut sink, &generator.boot_sentence(), args.checksum_corruption_rate, &mut rng).await?;

    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms));
    let mut burst_number: u64 = 0;
    loop {
        interval.tick().await;
        burst_number += 1;
        if let Some(limit) = args.burst_count {
            if burst_number > limit {
                break;
            }
        }

        if rng.gen_bool(args.binary_noise_rate.clamp(0.0, 1.0)) {
            info!(burst_number, "injecting binary-noise burst");
            sink.write_line(&binary_noise_burst(&mut rng, 200)).await?;
        }

        for sentence in generator.next_burst() {
            emit(&mut sink, &sentence, args.checksum_corruption_rate, &mut rng).await?;
        }
    }

    Ok(())
}

async fn emit(sink: &mut Sink, sentence: &str, corruption_rate: f64, rng: &mut impl Rng) -> anyhow::Result<()> {
    let wire = if rng.gen_bool(corruption_rate.clamp(0.0, 1.0)) { corrupt_checksum(sentence) } else { sentence.to_string() };
    let mut line = wire.into_bytes();
    line.extend_from_slice(b"\r\n");
    sink.write_line(&line).await
}
