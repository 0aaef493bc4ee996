//! `PNORC`..`PNORC4` — per-cell current velocity.

use crate::error::ErrorKind;
use crate::fields::{check_range_half_open, decode_date, decode_hex, decode_numeric, decode_time, decode_uint, DateOrder};
use crate::record::{LatchedConfig, ParsedRecord, PnorCell};

use super::{parse_tagged_fields, require_tag, split_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Base,
    C1,
    C2,
    C3,
    C4,
}

fn with_cell_index_warning(mut record: PnorCell, config: Option<&LatchedConfig>) -> PnorCell {
    if let Some(cfg) = config {
        record.cell_index_warning = record.cell_number < 1 || record.cell_number > cfg.num_cells;
    }
    record
}

pub fn parse(remainder: &str, variant: Variant, config: Option<&LatchedConfig>) -> Result<ParsedRecord, ErrorKind> {
    let record = match variant {
        Variant::Base => parse_positional(remainder, false)?,
        Variant::C1 => parse_positional(remainder, true)?,
        Variant::C2 => parse_tagged(remainder)?,
        Variant::C3 => parse_averaged(remainder, false)?,
        Variant::C4 => parse_averaged(remainder, true)?,
    };
    if let Some(dir) = record.direction_deg {
        check_range_half_open(Some(dir), 0.0, 360.0, "direction_deg")?;
    }
    Ok(ParsedRecord::PnorCell(with_cell_index_warning(record, config)))
}

fn parse_positional(remainder: &str, four_beam: bool) -> Result<PnorCell, ErrorKind> {
    let expected = if four_beam { 9 } else { 8 };
    let f = split_fields(remainder, expected)?;

    let date = decode_date(f[0], DateOrder::MonthDayYear, "date")?;
    let time = decode_time(f[1], "time")?;
    let cell_number = decode_uint(f[2], "cell_number")? as u16;
    let velocity_1 = decode_numeric(f[3], "velocity_1")?;
    let velocity_2 = decode_numeric(f[4], "velocity_2")?;
    let velocity_3 = decode_numeric(f[5], "velocity_3")?;

    let (velocity_4, speed, direction_deg) = if four_beam {
        (decode_numeric(f[6], "velocity_4")?, decode_numeric(f[7], "speed")?, decode_numeric(f[8], "direction_deg")?)
    } else {
        (None, decode_numeric(f[6], "speed")?, decode_numeric(f[7], "direction_deg")?)
    };

    Ok(PnorCell {
        date: Some(date),
        time: Some(time),
        cell_number,
        velocity_1,
        velocity_2,
        velocity_3,
        velocity_4,
        speed,
        direction_deg,
        amplitude: [None; 4],
        correlation: [None; 4],
        error_code: None,
        num_cells_averaged: None,
        cell_index_warning: false,
    })
}

/// `PNORC2`: tagged, axis velocities `VX,VY,VZ` plus a fourth-axis/error
/// reading `VERR` sharing the `velocity_4` slot with [`Variant::C1`]'s
/// fourth beam, and per-beam amplitude/correlation quality readings.
fn parse_tagged(remainder: &str) -> Result<PnorCell, ErrorKind> {
    let tags = parse_tagged_fields(remainder);

    let date = decode_date(require_tag(&tags, "DATE")?, DateOrder::MonthDayYear, "date")?;
    let time = decode_time(require_tag(&tags, "TIME")?, "time")?;
    let cell_number = decode_uint(require_tag(&tags, "CN")?, "cell_number")? as u16;
    let velocity_1 = decode_numeric(require_tag(&tags, "VX")?, "velocity_1")?;
    let velocity_2 = decode_numeric(require_tag(&tags, "VY")?, "velocity_2")?;
    let velocity_3 = decode_numeric(require_tag(&tags, "VZ")?, "velocity_3")?;
    let velocity_4 = tags.get("VERR").map(|v| decode_numeric(v, "velocity_4")).transpose()?.flatten();

    let mut amplitude = [None; 4];
    let mut correlation = [None; 4];
    for (i, key) in ["AMP1", "AMP2", "AMP3", "AMP4"].iter().enumerate() {
        if let Some(v) = tags.get(key) {
            let value = decode_uint(v, "amplitude")? as u8;
            if value > 100 {
                return Err(ErrorKind::FieldRange { field: "amplitude", reason: format!("{value} outside [0, 100]") });
            }
            amplitude[i] = Some(value);
        }
    }
    for (i, key) in ["COR1", "COR2", "COR3", "COR4"].iter().enumerate() {
        if let Some(v) = tags.get(key) {
            let value = decode_uint(v, "correlation")? as u8;
            if value > 100 {
                return Err(ErrorKind::FieldRange { field: "correlation", reason: format!("{value} outside [0, 100]") });
            }
            correlation[i] = Some(value);
        }
    }

    Ok(PnorCell {
        date: Some(date),
        time: Some(time),
        cell_number,
        velocity_1,
        velocity_2,
        velocity_3,
        velocity_4,
        speed: None,
        direction_deg: None,
        amplitude,
        correlation,
        error_code: None,
        num_cells_averaged: None,
        cell_index_warning: false,
    })
}

fn parse_averaged(remainder: &str, with_count: bool) -> Result<PnorCell, ErrorKind> {
    let expected = if with_count { 7 } else { 6 };
    let f = split_fields(remainder, expected)?;

    let date = decode_date(f[0], DateOrder::MonthDayYear, "date")?;
    let time = decode_time(f[1], "time")?;
    let cell_number = decode_uint(f[2], "cell_number")? as u16;
    let speed = decode_numeric(f[3], "speed")?;
    let direction_deg = decode_numeric(f[4], "direction_deg")?;
    let error_code = Some(decode_hex(f[5], 4, "error_code")?);
    let num_cells_averaged = if with_count { Some(decode_uint(f[6], "num_cells_averaged")? as u16) } else { None };

    Ok(PnorCell {
        date: Some(date),
        time: Some(time),
        cell_number,
        velocity_1: None,
        velocity_2: None,
        velocity_3: None,
        velocity_4: None,
        speed,
        direction_deg,
        amplitude: [None; 4],
        correlation: [None; 4],
        error_code,
        num_cells_averaged,
        cell_index_warning: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CoordSystem;

    fn cfg(num_cells: u16) -> LatchedConfig {
        LatchedConfig { instrument_type: 4, num_beams: 4, num_cells, coord_system: CoordSystem::Enu }
    }

    #[test]
    fn parses_base_positional() {
        let rec = parse("102115,090715,5,0.123,-0.045,0.006,0.131,205.4", Variant::Base, None).unwrap();
        let ParsedRecord::PnorCell(c) = rec else { panic!() };
        assert_eq!(c.cell_number, 5);
        assert_eq!(c.velocity_1, Some(0.123));
        assert_eq!(c.velocity_4, None);
    }

    #[test]
    fn c1_adds_fourth_beam() {
        let rec = parse("102115,090715,5,0.123,-0.045,0.006,0.010,0.131,205.4", Variant::C1, None).unwrap();
        let ParsedRecord::PnorCell(c) = rec else { panic!() };
        assert_eq!(c.velocity_4, Some(0.010));
    }

    #[test]
    fn c2_tagged_with_optional_amplitude() {
        let rec = parse("DATE=102115,TIME=090715,CN=5,VX=0.1,VY=0.2,VZ=0.3,AMP1=80,COR1=95", Variant::C2, None).unwrap();
        let ParsedRecord::PnorCell(c) = rec else { panic!() };
        assert_eq!(c.amplitude[0], Some(80));
        assert_eq!(c.correlation[0], Some(95));
        assert_eq!(c.amplitude[1], None);
    }

    #[test]
    fn c4_adds_cells_averaged() {
        let rec = parse("102115,090715,0,0.131,205.4,0000,14", Variant::C4, None).unwrap();
        let ParsedRecord::PnorCell(c) = rec else { panic!() };
        assert_eq!(c.num_cells_averaged, Some(14));
    }

    #[test]
    fn cell_index_warning_set_when_exceeding_latched_config() {
        let rec = parse("102115,090715,99,0.1,0.2,0.3,0.131,205.4", Variant::Base, Some(&cfg(20))).unwrap();
        let ParsedRecord::PnorCell(c) = rec else { panic!() };
        assert!(c.cell_index_warning);
        assert_eq!(c.cell_number, 99, "out-of-range index still persists, it is a warning not a parse failure");
    }

    #[test]
    fn no_config_means_no_warning_check() {
        let rec = parse("102115,090715,99,0.1,0.2,0.3,0.131,205.4", Variant::Base, None).unwrap();
        let ParsedRecord::PnorCell(c) = rec else { panic!() };
        assert!(!c.cell_index_warning);
    }

    #[test]
    fn amplitude_out_of_range_rejected() {
        let err = parse("DATE=102115,TIME=090715,CN=5,VX=0.1,VY=0.2,VZ=0.3,AMP1=150", Variant::C2, None).unwrap_err();
        assert_eq!(err.code(), "FIELD_RANGE");
    }
}
