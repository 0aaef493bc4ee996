//! The parsed-record type: a tagged sum over the ten sentence families /
//! twenty-one variants, plus the latched instrument configuration used to
//! validate cell-indexed sentences.
//!
//! Shared metadata (receive timestamp, raw bytes, checksum validity) is
//! deliberately *not* part of this enum — it lives in the enclosing
//! `RawLine`/store row that `adcp-core` builds around a `ParsedRecord`.
//! Each numeric field that the instrument can report as "unavailable" is
//! carried as `Option<f64>` (or a more specific `Option<T>`), never as a
//! sentinel numeric value.

use chrono::{NaiveDate, NaiveTime};

/// Instrument coordinate system, as reported by `PNORI`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSystem {
    Enu,
    Xyz,
    Beam,
}

/// The `PNORI` / `PNORI1` / `PNORI2` instrument configuration record.
#[derive(Debug, Clone, PartialEq)]
pub struct Pnori {
    pub instrument_type: u8,
    pub head_id: String,
    pub num_beams: u8,
    pub num_cells: u16,
    pub blanking_m: f64,
    pub cell_size_m: f64,
    pub coord_system: CoordSystem,
    /// `PNORI1`/`PNORI2` only.
    pub firmware_version: Option<String>,
    /// `PNORI2` only.
    pub serial_number: Option<String>,
    /// `PNORI2` only.
    pub head_frequency_khz: Option<u16>,
}

/// A snapshot of the most recently observed `PNORI` record, latched in
/// memory to constrain cell-indexed sentences. See [`Pnori`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatchedConfig {
    pub instrument_type: u8,
    pub num_beams: u8,
    pub num_cells: u16,
    pub coord_system: CoordSystem,
}

impl From<&Pnori> for LatchedConfig {
    fn from(p: &Pnori) -> Self {
        Self {
            instrument_type: p.instrument_type,
            num_beams: p.num_beams,
            num_cells: p.num_cells,
            coord_system: p.coord_system,
        }
    }
}

/// The `PNORS`..`PNORS4` sensor/environment snapshot family, unified into
/// one struct with the full superset of fields — variants differ only in
/// which fields are present and whether they're tagged.
#[derive(Debug, Clone, PartialEq)]
pub struct Pnors {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub error_code: Option<Vec<u8>>,
    pub status: Option<Vec<u8>>,
    pub battery_v: Option<f64>,
    pub sound_speed_mps: Option<f64>,
    pub heading_deg: Option<f64>,
    pub pitch_deg: Option<f64>,
    pub roll_deg: Option<f64>,
    pub pressure_dbar: Option<f64>,
    pub temperature_c: Option<f64>,
    pub analog_in1: Option<u16>,
    pub analog_in2: Option<u16>,
    pub heading_sd: Option<f64>,
    pub pitch_sd: Option<f64>,
    pub roll_sd: Option<f64>,
    pub pressure_sd: Option<f64>,
    /// The wire prefix this record was actually parsed from (`"PNORS"`,
    /// `"PNORS1"`, ..`"PNORS4"`), set by the parser that built it rather
    /// than re-derived from which fields happen to be present.
    pub wire_variant: &'static str,
}

/// Per-cell current velocity, `PNORC`..`PNORC4`.
#[derive(Debug, Clone, PartialEq)]
pub struct PnorCell {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub cell_number: u16,
    pub velocity_1: Option<f64>,
    pub velocity_2: Option<f64>,
    pub velocity_3: Option<f64>,
    /// `PNORC1` (4-beam) only.
    pub velocity_4: Option<f64>,
    /// Present on the base/`C1` variants only if the instrument reported
    /// it; always present on the cell-averaged `C3`/`C4` variants.
    pub speed: Option<f64>,
    pub direction_deg: Option<f64>,
    /// `PNORC2` tagged amplitude readings, one per beam (up to 4).
    pub amplitude: [Option<u8>; 4],
    /// `PNORC2` tagged correlation readings, one per beam (up to 4).
    pub correlation: [Option<u8>; 4],
    /// `PNORC3`/`PNORC4` only.
    pub error_code: Option<Vec<u8>>,
    /// `PNORC4` only.
    pub num_cells_averaged: Option<u16>,
    /// Set when `cell_number` exceeds the latched configuration's cell
    /// count — a cross-sentence validation warning, not a parse failure
    /// (the record still persists with its parsed values).
    pub cell_index_warning: bool,
}

/// Burst header preceding a batch of per-cell sentences, `PNORH3`/`PNORH4`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pnorh {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub error_code: Vec<u8>,
    pub status: Vec<u8>,
}

/// Altimeter reading, `PNORA` (positional or tagged format code 201).
#[derive(Debug, Clone, PartialEq)]
pub struct Pnora {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub pressure_dbar: Option<f64>,
    pub distance_m: Option<f64>,
    pub quality: u8,
    pub status: Vec<u8>,
    pub pitch_deg: Option<f64>,
    pub roll_deg: Option<f64>,
}

/// Wave summary, `PNORW` (22 fields).
#[derive(Debug, Clone, PartialEq)]
pub struct Pnorw {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub spectrum_basis: u8,
    pub processing_method: u8,
    pub hm0_m: Option<f64>,
    pub h3_m: Option<f64>,
    pub h10_m: Option<f64>,
    pub hmax_m: Option<f64>,
    pub tm02_s: Option<f64>,
    pub tp_s: Option<f64>,
    pub tz_s: Option<f64>,
    pub peak_direction_deg: Option<f64>,
    pub directional_spread_deg: Option<f64>,
    pub mean_direction_deg: Option<f64>,
    pub unidirectivity_index: Option<f64>,
    pub mean_pressure_dbar: Option<f64>,
    pub number_zero_crossings: Option<f64>,
    pub no_detects: Option<f64>,
    pub bad_detects: Option<f64>,
    pub near_surface_speed_mps: Option<f64>,
    pub near_surface_direction_deg: Option<f64>,
    pub error_code: Vec<u8>,
}

/// Wave-band parameters, `PNORB` when the sentence carries 14 fields (see
/// [`PnorbBottomTrack`] for the 8-field variant under the same prefix).
#[derive(Debug, Clone, PartialEq)]
pub struct PnorbWaveBand {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub band_index: u8,
    pub low_freq_hz: f64,
    pub high_freq_hz: f64,
    pub band_hm0_m: Option<f64>,
    pub band_tm02_s: Option<f64>,
    pub band_tp_s: Option<f64>,
    pub band_dir_tp_deg: Option<f64>,
    pub band_spread_deg: Option<f64>,
    pub band_main_direction_deg: Option<f64>,
    pub energy: Option<f64>,
    pub error_code: Vec<u8>,
    pub num_bands: u8,
}

/// Bottom-tracking reading, `PNORB` when the sentence carries 8 fields.
/// Routed to a distinct parsed table from [`PnorbWaveBand`] (see
/// DESIGN.md for the field-arity detection rule this implements).
#[derive(Debug, Clone, PartialEq)]
pub struct PnorbBottomTrack {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub beam_range_m: [Option<f64>; 4],
    pub quality: u8,
    pub status: Vec<u8>,
}

/// Echo intensity per cell, `PNORE` (4 beams).
#[derive(Debug, Clone, PartialEq)]
pub struct Pnore {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub cell_number: u16,
    pub amplitude: [u8; 4],
}

/// One frequency bin's Fourier coefficients, `PNORF`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourierCoefficient {
    pub a1: Option<f64>,
    pub b1: Option<f64>,
    pub a2: Option<f64>,
    pub b2: Option<f64>,
}

/// Fourier spectral coefficients, `PNORF` (variable length).
#[derive(Debug, Clone, PartialEq)]
pub struct Pnorf {
    pub flag: u8,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub basis: u8,
    pub start_freq_hz: f64,
    pub step_freq_hz: f64,
    pub coefficients: Vec<FourierCoefficient>,
}

/// Directional spectrum bin, `PNORWD`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pnorwd {
    pub freq_bin_hz: f64,
    pub direction_deg: f64,
    pub spread_deg: Option<f64>,
    pub energy: Option<f64>,
}

/// The tagged sum type over all twenty-one sentence variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    Pnori(Pnori),
    Pnors(Pnors),
    PnorCell(PnorCell),
    Pnorh(Pnorh),
    Pnora(Pnora),
    Pnorw(Pnorw),
    PnorbWaveBand(PnorbWaveBand),
    PnorbBottomTrack(PnorbBottomTrack),
    Pnore(Pnore),
    Pnorf(Pnorf),
    Pnorwd(Pnorwd),
}

impl ParsedRecord {
    /// The family table this record belongs to, for store routing.
    pub fn family(&self) -> &'static str {
        match self {
            ParsedRecord::Pnori(_) => "pnori",
            ParsedRecord::Pnors(_) => "pnors",
            ParsedRecord::PnorCell(_) => "pnorc",
            ParsedRecord::Pnorh(_) => "pnorh",
            ParsedRecord::Pnora(_) => "pnora",
            ParsedRecord::Pnorw(_) => "pnorw",
            ParsedRecord::PnorbWaveBand(_) | ParsedRecord::PnorbBottomTrack(_) => "pnorb",
            ParsedRecord::Pnore(_) => "pnore",
            ParsedRecord::Pnorf(_) => "pnorf",
            ParsedRecord::Pnorwd(_) => "pnorwd",
        }
    }
}
