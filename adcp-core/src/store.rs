//! Embedded columnar store: raw-line log, parse-error log, and one table
//! per sentence family. Sibling-variant families (`PNORI`/`PNORI1`/
//! `PNORI2` and the `PNORS`/`PNORC` families) share a single physical
//! table keyed by a `variant` discriminator column, with a `CREATE VIEW`
//! per published prefix so external SQL consumers still see the stable
//! per-family read contract spec §9 Open Question (c) demands.
//!
//! The consumer is this store's sole owner; no locking is needed because
//! every write happens on the consumer's task.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};

use nmea_proto::record::{ParsedRecord, PnorCell};
use nmea_proto::ParseError;

use crate::error::CoreError;

pub struct Store {
    conn: Connection,
}

fn hex_of(bytes: &Option<Vec<u8>>) -> Option<String> {
    bytes.as_ref().map(|b| b.iter().map(|x| format!("{x:02X}")).collect())
}

fn date_str(d: &Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.format("%Y-%m-%d").to_string())
}

fn time_str(t: &Option<NaiveTime>) -> Option<String> {
    t.map(|t| t.format("%H:%M:%S").to_string())
}

impl Store {
    pub fn open(path: &std::path::Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn conn_for_test(&self) -> &Connection {
        &self.conn
    }

    fn init_schema(&self) -> Result<(), CoreError> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Writes a raw-line row plus its companion parsed-record or
    /// parse-error row inside a single transaction (invariant 1 in
    /// spec §8: exactly one companion row per raw line, modulo binary
    /// mode entries which stand alone).
    pub fn write_batch(&mut self, items: &[BatchItem]) -> Result<(), CoreError> {
        let tx = self.conn.transaction()?;
        for item in items {
            let raw_id: i64 = tx.query_row(
                "INSERT INTO raw_lines (received_at_ms, bytes, outcome, prefix, checksum_valid, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
                params![
                    item.received_at_ms,
                    item.raw_bytes,
                    item.outcome.as_str(),
                    item.prefix,
                    item.checksum_valid,
                    item.error_message,
                ],
                |row| row.get(0),
            )?;

            match &item.disposition {
                Disposition::Parsed(record) => insert_parsed_record(&tx, item.received_at_ms, raw_id, record)?,
                Disposition::Error(err) => insert_parse_error(&tx, item.received_at_ms, &item.raw_bytes, err)?,
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail,
    Binary,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Fail => "fail",
            Outcome::Binary => "binary",
        }
    }
}

pub enum Disposition {
    Parsed(ParsedRecord),
    /// Also used for `BINARY_MODE_ENTRY`/`BINARY_MODE_EXIT` marker rows.
    Error(ParseError),
}

pub struct BatchItem {
    pub received_at_ms: i64,
    pub raw_bytes: Vec<u8>,
    pub outcome: Outcome,
    pub prefix: Option<String>,
    pub checksum_valid: bool,
    pub error_message: Option<String>,
    pub disposition: Disposition,
}

fn insert_parse_error(tx: &rusqlite::Transaction, received_at_ms: i64, bytes: &[u8], err: &ParseError) -> rusqlite::Result<()> {
    let (expected, actual) = match &err.kind {
        nmea_proto::ErrorKind::ChecksumMismatch { expected, actual } => (Some(expected.clone()), Some(actual.clone())),
        _ => (None, None),
    };
    tx.execute(
        "INSERT INTO parse_errors (received_at_ms, bytes, error_kind, attempted_prefix, expected_checksum, actual_checksum)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![received_at_ms, bytes, err.kind.code(), err.attempted_prefix, expected, actual],
    )?;
    Ok(())
}

fn insert_parsed_record(tx: &rusqlite::Transaction, received_at_ms: i64, raw_id: i64, record: &ParsedRecord) -> rusqlite::Result<()> {
    match record {
        ParsedRecord::Pnori(p) => {
            let variant = match (&p.firmware_version, &p.serial_number) {
                (Some(_), _) => "PNORI1",
                (None, Some(_)) => "PNORI2",
                (None, None) => "PNORI",
            };
            tx.execute(
                "INSERT INTO pnori12 (received_at_ms, raw_id, variant, instrument_type, head_id, num_beams, num_cells,
                    blanking_m, cell_size_m, coord_system, firmware_version, serial_number, head_frequency_khz)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
                params![
                    received_at_ms, raw_id, variant, p.instrument_type, p.head_id, p.num_beams, p.num_cells,
                    p.blanking_m, p.cell_size_m, format!("{:?}", p.coord_system), p.firmware_version,
                    p.serial_number, p.head_frequency_khz,
                ],
            )?;
        }
        ParsedRecord::Pnors(p) => {
            let variant = p.wire_variant;
            tx.execute(
                "INSERT INTO pnors (received_at_ms, raw_id, variant, date, time, error_code, status, battery_v,
                    sound_speed_mps, heading_deg, pitch_deg, roll_deg, pressure_dbar, temperature_c, analog_in1,
                    analog_in2, heading_sd, pitch_sd, roll_sd, pressure_sd)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
                params![
                    received_at_ms, raw_id, variant, date_str(&p.date), time_str(&p.time), hex_of(&p.error_code),
                    hex_of(&p.status), p.battery_v, p.sound_speed_mps, p.heading_deg, p.pitch_deg, p.roll_deg,
                    p.pressure_dbar, p.temperature_c, p.analog_in1, p.analog_in2, p.heading_sd, p.pitch_sd,
                    p.roll_sd, p.pressure_sd,
                ],
            )?;
        }
        ParsedRecord::PnorCell(c) => insert_pnorc(tx, received_at_ms, raw_id, c)?,
        ParsedRecord::Pnorh(h) => {
            tx.execute(
                "INSERT INTO pnorh (received_at_ms, raw_id, date, time, error_code, status) VALUES (?1,?2,?3,?4,?5,?6)",
                params![received_at_ms, raw_id, h.date.format("%Y-%m-%d").to_string(), h.time.format("%H:%M:%S").to_string(),
                    h.error_code.iter().map(|b| format!("{b:02X}")).collect::<String>(),
                    h.status.iter().map(|b| format!("{b:02X}")).collect::<String>()],
            )?;
        }
        ParsedRecord::Pnora(a) => {
            tx.execute(
                "INSERT INTO pnora (received_at_ms, raw_id, date, time, pressure_dbar, distance_m, quality, status, pitch_deg, roll_deg)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
                params![
                    received_at_ms, raw_id, a.date.format("%Y-%m-%d").to_string(), a.time.format("%H:%M:%S").to_string(),
                    a.pressure_dbar, a.distance_m, a.quality, a.status.iter().map(|b| format!("{b:02X}")).collect::<String>(),
                    a.pitch_deg, a.roll_deg,
                ],
            )?;
        }
        ParsedRecord::Pnorw(w) => {
            tx.execute(
                "INSERT INTO pnorw (received_at_ms, raw_id, date, time, spectrum_basis, processing_method, hm0_m, h3_m,
                    h10_m, hmax_m, tm02_s, tp_s, tz_s, peak_direction_deg, directional_spread_deg, mean_direction_deg,
                    unidirectivity_index, mean_pressure_dbar, number_zero_crossings, no_detects, bad_detects,
                    near_surface_speed_mps, near_surface_direction_deg, error_code)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24)",
                params![
                    received_at_ms, raw_id, w.date.format("%Y-%m-%d").to_string(), w.time.format("%H:%M:%S").to_string(),
                    w.spectrum_basis, w.processing_method, w.hm0_m, w.h3_m, w.h10_m, w.hmax_m, w.tm02_s, w.tp_s, w.tz_s,
                    w.peak_direction_deg, w.directional_spread_deg, w.mean_direction_deg, w.unidirectivity_index,
                    w.mean_pressure_dbar, w.number_zero_crossings, w.no_detects, w.bad_detects, w.near_surface_speed_mps,
                    w.near_surface_direction_deg, w.error_code.iter().map(|b| format!("{b:02X}")).collect::<String>(),
                ],
            )?;
        }
        ParsedRecord::PnorbWaveBand(b) => {
            tx.execute(
                "INSERT INTO pnorb_wave_band (received_at_ms, raw_id, date, time, band_index, low_freq_hz, high_freq_hz,
                    band_hm0_m, band_tm02_s, band_tp_s, band_dir_tp_deg, band_spread_deg, band_main_direction_deg,
                    energy, error_code, num_bands)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
                params![
                    received_at_ms, raw_id, b.date.format("%Y-%m-%d").to_string(), b.time.format("%H:%M:%S").to_string(),
                    b.band_index, b.low_freq_hz, b.high_freq_hz, b.band_hm0_m, b.band_tm02_s, b.band_tp_s,
                    b.band_dir_tp_deg, b.band_spread_deg, b.band_main_direction_deg, b.energy,
                    b.error_code.iter().map(|x| format!("{x:02X}")).collect::<String>(), b.num_bands,
                ],
            )?;
        }
        ParsedRecord::PnorbBottomTrack(b) => {
            tx.execute(
                "INSERT INTO pnorb_bottom_track (received_at_ms, raw_id, date, time, beam1_range_m, beam2_range_m,
                    beam3_range_m, beam4_range_m, quality, status)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
                params![
                    received_at_ms, raw_id, b.date.format("%Y-%m-%d").to_string(), b.time.format("%H:%M:%S").to_string(),
                    b.beam_range_m[0], b.beam_range_m[1], b.beam_range_m[2], b.beam_range_m[3], b.quality,
                    b.status.iter().map(|x| format!("{x:02X}")).collect::<String>(),
                ],
            )?;
        }
        ParsedRecord::Pnore(e) => {
            tx.execute(
                "INSERT INTO pnore (received_at_ms, raw_id, date, time, cell_number, amplitude1, amplitude2, amplitude3, amplitude4)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                params![
                    received_at_ms, raw_id, e.date.format("%Y-%m-%d").to_string(), e.time.format("%H:%M:%S").to_string(),
                    e.cell_number, e.amplitude[0], e.amplitude[1], e.amplitude[2], e.amplitude[3],
                ],
            )?;
        }
        ParsedRecord::Pnorf(f) => {
            let coeffs_json = serde_json::to_string(
                &f.coefficients.iter().map(|c| (c.a1, c.b1, c.a2, c.b2)).collect::<Vec<_>>(),
            )
            .unwrap_or_else(|_| "[]".to_string());
            tx.execute(
                "INSERT INTO pnorf (received_at_ms, raw_id, flag, date, time, basis, start_freq_hz, step_freq_hz, coefficients_json)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                params![
                    received_at_ms, raw_id, f.flag, f.date.format("%Y-%m-%d").to_string(), f.time.format("%H:%M:%S").to_string(),
                    f.basis, f.start_freq_hz, f.step_freq_hz, coeffs_json,
                ],
            )?;
        }
        ParsedRecord::Pnorwd(wd) => {
            tx.execute(
                "INSERT INTO pnorwd (received_at_ms, raw_id, freq_bin_hz, direction_deg, spread_deg, energy) VALUES (?1,?2,?3,?4,?5,?6)",
                params![received_at_ms, raw_id, wd.freq_bin_hz, wd.direction_deg, wd.spread_deg, wd.energy],
            )?;
        }
    }
    Ok(())
}

fn insert_pnorc(tx: &rusqlite::Transaction, received_at_ms: i64, raw_id: i64, c: &PnorCell) -> rusqlite::Result<()> {
    let variant = if c.num_cells_averaged.is_some() {
        "PNORC4"
    } else if c.error_code.is_some() {
        "PNORC3"
    } else if c.amplitude.iter().any(Option::is_some) || c.correlation.iter().any(Option::is_some) {
        "PNORC2"
    } else if c.velocity_4.is_some() {
        "PNORC1"
    } else {
        "PNORC"
    };
    tx.execute(
        "INSERT INTO pnorc (received_at_ms, raw_id, variant, date, time, cell_number, velocity_1, velocity_2, velocity_3,
            velocity_4, speed, direction_deg, amplitude1, amplitude2, amplitude3, amplitude4, correlation1, correlation2,
            correlation3, correlation4, error_code, num_cells_averaged, cell_index_warning)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23)",
        params![
            received_at_ms, raw_id, variant, date_str(&c.date), time_str(&c.time), c.cell_number, c.velocity_1,
            c.velocity_2, c.velocity_3, c.velocity_4, c.speed, c.direction_deg, c.amplitude[0], c.amplitude[1],
            c.amplitude[2], c.amplitude[3], c.correlation[0], c.correlation[1], c.correlation[2], c.correlation[3],
            hex_of(&c.error_code), c.num_cells_averaged, c.cell_index_warning,
        ],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS raw_lines (
    id INTEGER PRIMARY KEY,
    received_at_ms INTEGER NOT NULL,
    bytes BLOB NOT NULL,
    outcome TEXT NOT NULL,
    prefix TEXT,
    checksum_valid INTEGER NOT NULL,
    error_message TEXT
);

CREATE TABLE IF NOT EXISTS parse_errors (
    id INTEGER PRIMARY KEY,
    received_at_ms INTEGER NOT NULL,
    bytes BLOB NOT NULL,
    error_kind TEXT NOT NULL,
    attempted_prefix TEXT,
    expected_checksum TEXT,
    actual_checksum TEXT
);

CREATE TABLE IF NOT EXISTS pnori12 (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL, variant TEXT NOT NULL,
    instrument_type INTEGER NOT NULL, head_id TEXT NOT NULL, num_beams INTEGER NOT NULL, num_cells INTEGER NOT NULL,
    blanking_m REAL NOT NULL, cell_size_m REAL NOT NULL, coord_system TEXT NOT NULL,
    firmware_version TEXT, serial_number TEXT, head_frequency_khz INTEGER
);
CREATE VIEW IF NOT EXISTS pnori AS SELECT * FROM pnori12 WHERE variant = 'PNORI';
CREATE VIEW IF NOT EXISTS pnori1 AS SELECT * FROM pnori12 WHERE variant = 'PNORI1';
CREATE VIEW IF NOT EXISTS pnori2 AS SELECT * FROM pnori12 WHERE variant = 'PNORI2';

CREATE TABLE IF NOT EXISTS pnors (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL, variant TEXT NOT NULL,
    date TEXT, time TEXT, error_code TEXT, status TEXT, battery_v REAL, sound_speed_mps REAL, heading_deg REAL,
    pitch_deg REAL, roll_deg REAL, pressure_dbar REAL, temperature_c REAL, analog_in1 INTEGER, analog_in2 INTEGER,
    heading_sd REAL, pitch_sd REAL, roll_sd REAL, pressure_sd REAL
);
CREATE VIEW IF NOT EXISTS pnors_base AS SELECT * FROM pnors WHERE variant = 'PNORS';
CREATE VIEW IF NOT EXISTS pnors1 AS SELECT * FROM pnors WHERE variant = 'PNORS1';
CREATE VIEW IF NOT EXISTS pnors2 AS SELECT * FROM pnors WHERE variant = 'PNORS2';
CREATE VIEW IF NOT EXISTS pnors3 AS SELECT * FROM pnors WHERE variant = 'PNORS3';
CREATE VIEW IF NOT EXISTS pnors4 AS SELECT * FROM pnors WHERE variant = 'PNORS4';

CREATE TABLE IF NOT EXISTS pnorc (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL, variant TEXT NOT NULL,
    date TEXT, time TEXT, cell_number INTEGER NOT NULL, velocity_1 REAL, velocity_2 REAL, velocity_3 REAL,
    velocity_4 REAL, speed REAL, direction_deg REAL, amplitude1 INTEGER, amplitude2 INTEGER, amplitude3 INTEGER,
    amplitude4 INTEGER, correlation1 INTEGER, correlation2 INTEGER, correlation3 INTEGER, correlation4 INTEGER,
    error_code TEXT, num_cells_averaged INTEGER, cell_index_warning INTEGER NOT NULL
);
CREATE VIEW IF NOT EXISTS pnorc_base AS SELECT * FROM pnorc WHERE variant = 'PNORC';
CREATE VIEW IF NOT EXISTS pnorc1 AS SELECT * FROM pnorc WHERE variant = 'PNORC1';
CREATE VIEW IF NOT EXISTS pnorc2 AS SELECT * FROM pnorc WHERE variant = 'PNORC2';
CREATE VIEW IF NOT EXISTS pnorc3 AS SELECT * FROM pnorc WHERE variant = 'PNORC3';
CREATE VIEW IF NOT EXISTS pnorc4 AS SELECT * FROM pnorc WHERE variant = 'PNORC4';

CREATE TABLE IF NOT EXISTS pnorh (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    date TEXT NOT NULL, time TEXT NOT NULL, error_code TEXT NOT NULL, status TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pnora (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    date TEXT NOT NULL, time TEXT NOT NULL, pressure_dbar REAL, distance_m REAL, quality INTEGER NOT NULL,
    status TEXT NOT NULL, pitch_deg REAL, roll_deg REAL
);

CREATE TABLE IF NOT EXISTS pnorw (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    date TEXT NOT NULL, time TEXT NOT NULL, spectrum_basis INTEGER NOT NULL, processing_method INTEGER NOT NULL,
    hm0_m REAL, h3_m REAL, h10_m REAL, hmax_m REAL, tm02_s REAL, tp_s REAL, tz_s REAL, peak_direction_deg REAL,
    directional_spread_deg REAL, mean_direction_deg REAL, unidirectivity_index REAL, mean_pressure_dbar REAL,
    number_zero_crossings REAL, no_detects REAL, bad_detects REAL, near_surface_speed_mps REAL,
    near_surface_direction_deg REAL, error_code TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pnorb_wave_band (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    date TEXT NOT NULL, time TEXT NOT NULL, band_index INTEGER NOT NULL, low_freq_hz REAL NOT NULL,
    high_freq_hz REAL NOT NULL, band_hm0_m REAL, band_tm02_s REAL, band_tp_s REAL, band_dir_tp_deg REAL,
    band_spread_deg REAL, band_main_direction_deg REAL, energy REAL, error_code TEXT NOT NULL, num_bands INTEGER NOT NULL
);
CREATE VIEW IF NOT EXISTS pnorb AS SELECT * FROM pnorb_wave_band;

CREATE TABLE IF NOT EXISTS pnorb_bottom_track (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    date TEXT NOT NULL, time TEXT NOT NULL, beam1_range_m REAL, beam2_range_m REAL, beam3_range_m REAL,
    beam4_range_m REAL, quality INTEGER NOT NULL, status TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pnore (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    date TEXT NOT NULL, time TEXT NOT NULL, cell_number INTEGER NOT NULL,
    amplitude1 INTEGER NOT NULL, amplitude2 INTEGER NOT NULL, amplitude3 INTEGER NOT NULL, amplitude4 INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pnorf (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    flag INTEGER NOT NULL, date TEXT NOT NULL, time TEXT NOT NULL, basis INTEGER NOT NULL,
    start_freq_hz REAL NOT NULL, step_freq_hz REAL NOT NULL, coefficients_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pnorwd (
    id INTEGER PRIMARY KEY, received_at_ms INTEGER NOT NULL, raw_id INTEGER NOT NULL,
    freq_bin_hz REAL NOT NULL, direction_deg REAL NOT NULL, spread_deg REAL, energy REAL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use nmea_proto::record::{CoordSystem, Pnori};

    fn sample_pnori() -> ParsedRecord {
        ParsedRecord::Pnori(Pnori {
            instrument_type: 4,
            head_id: "Sig1000".into(),
            num_beams: 4,
            num_cells: 20,
            blanking_m: 0.2,
            cell_size_m: 1.0,
            coord_system: CoordSystem::Enu,
            firmware_version: None,
            serial_number: None,
            head_frequency_khz: None,
        })
    }

    #[test]
    fn schema_creates_without_error() {
        Store::open_in_memory().unwrap();
    }

    #[test]
    fn write_batch_inserts_raw_line_and_parsed_row() {
        let mut store = Store::open_in_memory().unwrap();
        let item = BatchItem {
            received_at_ms: 1_000,
            raw_bytes: b"$PNORI,4,Sig1000,4,20,0.20,1.00,0*00".to_vec(),
            outcome: Outcome::Ok,
            prefix: Some("PNORI".into()),
            checksum_valid: true,
            error_message: None,
            disposition: Disposition::Parsed(sample_pnori()),
        };
        store.write_batch(&[item]).unwrap();

        let raw_count: i64 = store.conn.query_row("SELECT COUNT(*) FROM raw_lines", [], |r| r.get(0)).unwrap();
        let pnori_count: i64 = store.conn.query_row("SELECT COUNT(*) FROM pnori", [], |r| r.get(0)).unwrap();
        assert_eq!(raw_count, 1);
        assert_eq!(pnori_count, 1);
    }

    #[test]
    fn write_batch_inserts_parse_error() {
        let mut store = Store::open_in_memory().unwrap();
        let err = ParseError::new(nmea_proto::ErrorKind::ChecksumMismatch { expected: "1A".into(), actual: "1B".into() });
        let item = BatchItem {
            received_at_ms: 2_000,
            raw_bytes: b"$PNORC,102115,090715,1,12.34,56.78,90.12*XX".to_vec(),
            outcome: Outcome::Fail,
            prefix: Some("PNORC".into()),
            checksum_valid: false,
            error_message: Some("checksum mismatch".into()),
            disposition: Disposition::Error(err),
        };
        store.write_batch(&[item]).unwrap();

        let count: i64 = store.conn.query_row("SELECT COUNT(*) FROM parse_errors", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
        let kind: String = store.conn.query_row("SELECT error_kind FROM parse_errors", [], |r| r.get(0)).unwrap();
        assert_eq!(kind, "CHECKSUM_MISMATCH");
    }
}
