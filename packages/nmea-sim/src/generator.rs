//! Synthetic ADCP telemetry generator.
//!
//! Produces the same sentence families `nmea-proto` parses, using its own
//! `to_sentence` serializers where one is defined (`PNORI`, `PNORS`) and a
//! small local sentence builder for the rest — there is no round-trip
//! contract to honor for those families, just a wire-valid frame.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use nmea_proto::checksum::{checksum, format_checksum};
use nmea_proto::record::{CoordSystem, Pnori, Pnors};

/// Builds a `$PREFIX,f1,f2,...*HH` sentence from already-stringified fields.
fn sentence(prefix: &str, fields: &[String]) -> String {
    let payload = if fields.is_empty() { prefix.to_string() } else { format!("{prefix},{}", fields.join(",")) };
    let cs = checksum(payload.as_bytes());
    let hex = format_checksum(cs);
    format!("${payload}*{}", std::str::from_utf8(&hex).unwrap())
}

/// Fixed instrument geometry the generator latches for the whole run —
/// mirrors the real instrument emitting one `PNORI` at boot and never
/// again until reconfigured.
pub struct FleetConfig {
    pub instrument_type: u8,
    pub head_id: String,
    pub num_beams: u8,
    pub num_cells: u16,
    pub blanking_m: f64,
    pub cell_size_m: f64,
    pub coord_system: CoordSystem,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            instrument_type: 4,
            head_id: "Signature1000900001".to_string(),
            num_beams: 4,
            num_cells: 20,
            blanking_m: 0.20,
            cell_size_m: 1.00,
            coord_system: CoordSystem::Enu,
        }
    }
}

impl FleetConfig {
    fn to_pnori(&self) -> Pnori {
        Pnori {
            instrument_type: self.instrument_type,
            head_id: self.head_id.clone(),
            num_beams: self.num_beams,
            num_cells: self.num_cells,
            blanking_m: self.blanking_m,
            cell_size_m: self.cell_size_m,
            coord_system: self.coord_system,
            firmware_version: None,
            serial_number: None,
            head_frequency_khz: None,
        }
    }
}

pub struct TelemetryGenerator {
    config: FleetConfig,
    cycle: u64,
    clock: chrono::NaiveDateTime,
    rng: rand::rngs::StdRng,
}

impl TelemetryGenerator {
    pub fn new(config: FleetConfig, seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            config,
            cycle: 0,
            clock: chrono::Utc::now().naive_utc(),
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// The one-time `PNORI` boot sentence.
    pub fn boot_sentence(&self) -> String {
        self.config.to_pnori().to_sentence()
    }

    fn stamp(&mut self) -> (String, String) {
        self.clock += chrono::Duration::seconds(1);
        (self.clock.format("%m%d%y").to_string(), self.clock.format("%H%M%S").to_string())
    }

    fn noisy(&mut self, mean: f64, sd: f64) -> f64 {
        Normal::new(mean, sd).unwrap().sample(&mut self.rng)
    }

    /// One burst: header, per-cell current velocity, a sensor snapshot,
    /// and — every tenth cycle — one of each of the lower-frequency wave
    /// and spectral families, so a short run still exercises every
    /// supported prefix.
    pub fn next_burst(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        self.cycle += 1;

        let (date, time) = self.stamp();
        out.push(sentence("PNORH4", &[date.clone(), time.clone(), "0000".into(), "2A4C0000".into()]));

        for cell in 1..=self.config.num_cells {
            let v1 = self.noisy(0.1, 0.05);
            let v2 = self.noisy(0.0, 0.05);
            let v3 = self.noisy(0.0, 0.02);
            let speed = (v1 * v1 + v2 * v2).sqrt();
            let direction = self.rng.gen_range(0.0..359.9);
            out.push(sentence(
                "PNORC",
                &[
                    date.clone(),
                    time.clone(),
                    cell.to_string(),
                    format!("{v1:.3}"),
                    format!("{v2:.3}"),
                    format!("{v3:.3}"),
                    format!("{speed:.3}"),
                    format!("{direction:.1}"),
                ],
            ));
        }

        let sensor = Pnors {
            date: Some(chrono::NaiveDate::parse_from_str(&date, "%m%d%y").unwrap()),
            time: Some(chrono::NaiveTime::parse_from_str(&time, "%H%M%S").unwrap()),
            error_code: Some(vec![0, 0, 0, 0]),
            status: Some(vec![0x2A, 0x48, 0x00, 0x00]),
            battery_v: Some(self.noisy(14.4, 0.2)),
            sound_speed_mps: Some(self.noisy(1500.0, 2.0)),
            heading_deg: Some(self.rng.gen_range(0.0..359.9)),
            pitch_deg: Some(self.noisy(0.0, 1.0)),
            roll_deg: Some(self.noisy(0.0, 1.0)),
            pressure_dbar: Some(self.noisy(20.0, 0.5)),
            temperature_c: Some(self.noisy(18.0, 0.3)),
            analog_in1: Some(0),
            analog_in2: Some(0),
            heading_sd: None,
            pitch_sd: None,
            roll_sd: None,
            pressure_sd: None,
            wire_variant: "PNORS1",
        };
        out.push(sensor.to_sentence());

        if self.cycle % 10 == 0 {
            out.extend(self.low_rate_families(&date, &time));
        }

        out
    }

    fn low_rate_families(&mut self, date: &str, time: &str) -> Vec<String> {
        let mut out = Vec::new();

        out.push(sentence(
            "PNORA",
            &[
                date.into(),
                time.into(),
                format!("{:.3}", self.noisy(20.0, 0.5)),
                format!("{:.2}", self.noisy(45.0, 1.0)),
                "95".into(),
                "2A".into(),
                format!("{:.1}", self.noisy(0.0, 1.0)),
                format!("{:.1}", self.noisy(0.0, 1.0)),
            ],
        ));

        out.push(sentence(
            "PNORW",
            &(1..=22)
                .map(|i| match i {
                    1 => date.to_string(),
                    2 => time.to_string(),
                    3 | 4 => "1".to_string(),
                    22 => "0000".to_string(),
                    _ => format!("{:.2}", self.noisy(1.0, 0.3).max(0.0)),
                })
                .collect::<Vec<_>>(),
        ));

        out.push(sentence(
            "PNORB",
            &[
                date.into(),
                time.into(),
                "0".into(),
                "0.05".into(),
                "0.15".into(),
                format!("{:.2}", self.noisy(1.0, 0.2).max(0.0)),
                format!("{:.2}", self.noisy(5.0, 0.5).max(0.0)),
                format!("{:.2}", self.noisy(6.0, 0.5).max(0.0)),
                format!("{:.1}", self.rng.gen_range(0.0..359.9)),
                format!("{:.1}", self.noisy(20.0, 2.0).max(0.0)),
                format!("{:.1}", self.rng.gen_range(0.0..359.9)),
                format!("{:.2}", self.noisy(12.0, 1.0).max(0.0)),
                "0000".into(),
                self.config.num_cells.to_string(),
            ],
        ));

        out.push(sentence(
            "PNORE",
            &[
                date.into(),
                time.into(),
                "1".into(),
                self.rng.gen_range(80..140).to_string(),
                self.rng.gen_range(80..140).to_string(),
                self.rng.gen_range(80..140).to_string(),
                self.rng.gen_range(80..140).to_string(),
            ],
        ));

        let coeffs: Vec<String> = (0..4).flat_map(|_| (0..4).map(|_| format!("{:.3}", self.noisy(0.0, 0.1)))).collect();
        let mut fourier = vec!["0".to_string(), date.into(), time.into(), "1".into(), "0.0".into(), "0.01".into(), "4".into()];
        fourier.extend(coeffs);
        out.push(sentence("PNORF", &fourier));

        out.push(sentence(
            "PNORWD",
            &[
                "0.05".into(),
                format!("{:.1}", self.rng.gen_range(0.0..359.9)),
                format!("{:.1}", self.noisy(20.0, 2.0).max(0.0)),
                format!("{:.2}", self.noisy(12.0, 1.0).max(0.0)),
            ],
        ));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_sentence_parses_back_through_nmea_proto() {
        let gen = TelemetryGenerator::new(FleetConfig::default(), 1);
        let sentence = gen.boot_sentence();
        let frame = nmea_proto::frame_line(sentence.as_bytes(), false).unwrap();
        let record = nmea_proto::route(&frame, None).unwrap();
        assert!(matches!(record, nmea_proto::ParsedRecord::Pnori(_)));
    }

    #[test]
    fn burst_sentences_all_frame_and_route_cleanly() {
        let mut gen = TelemetryGenerator::new(FleetConfig { num_cells: 3, ..FleetConfig::default() }, 42);
        for sentence in gen.next_burst() {
            let frame = nmea_proto::frame_line(sentence.as_bytes(), false)
                .unwrap_or_else(|e| panic!("{sentence:?} failed to frame: {e:?}"));
            nmea_proto::route(&frame, None).unwrap_or_else(|e| panic!("{sentence:?} failed to route: {e:?}"));
        }
    }

    #[test]
    fn tenth_cycle_includes_the_low_rate_families() {
        let mut gen = TelemetryGenerator::new(FleetConfig { num_cells: 2, ..FleetConfig::default() }, 7);
        let mut last = Vec::new();
        for _ in 0..10 {
            last = gen.next_burst();
        }
        assert!(last.iter().any(|s| s.starts_with("$PNORW,")));
        assert!(last.iter().any(|s| s.starts_with("$PNORF,")));
    }
}
