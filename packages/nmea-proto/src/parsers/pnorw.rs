//! `PNORW` — wave summary (22 positional fields).

use crate::error::ErrorKind;
use crate::fields::{check_range_half_open, decode_date, decode_hex, decode_numeric, decode_time, decode_uint, DateOrder};
use crate::record::{ParsedRecord, Pnorw};

use super::split_fields;

pub fn parse(remainder: &str) -> Result<ParsedRecord, ErrorKind> {
    let f = split_fields(remainder, 22)?;

    let record = Pnorw {
        date: decode_date(f[0], DateOrder::MonthDayYear, "date")?,
        time: decode_time(f[1], "time")?,
        spectrum_basis: decode_uint(f[2], "spectrum_basis")? as u8,
        processing_method: decode_uint(f[3], "processing_method")? as u8,
        hm0_m: decode_numeric(f[4], "hm0_m")?,
        h3_m: decode_numeric(f[5], "h3_m")?,
        h10_m: decode_numeric(f[6], "h10_m")?,
        hmax_m: decode_numeric(f[7], "hmax_m")?,
        tm02_s: decode_numeric(f[8], "tm02_s")?,
        tp_s: decode_numeric(f[9], "tp_s")?,
        tz_s: decode_numeric(f[10], "tz_s")?,
        peak_direction_deg: decode_numeric(f[11], "peak_direction_deg")?,
        directional_spread_deg: decode_numeric(f[12], "directional_spread_deg")?,
        mean_direction_deg: decode_numeric(f[13], "mean_direction_deg")?,
        unidirectivity_index: decode_numeric(f[14], "unidirectivity_index")?,
        mean_pressure_dbar: decode_numeric(f[15], "mean_pressure_dbar")?,
        number_zero_crossings: decode_numeric(f[16], "number_zero_crossings")?,
        no_detects: decode_numeric(f[17], "no_detects")?,
        bad_detects: decode_numeric(f[18], "bad_detects")?,
        near_surface_speed_mps: decode_numeric(f[19], "near_surface_speed_mps")?,
        near_surface_direction_deg: decode_numeric(f[20], "near_surface_direction_deg")?,
        error_code: decode_hex(f[21], 4, "error_code")?,
    };

    check_range_half_open(record.peak_direction_deg, 0.0, 360.0, "peak_direction_deg")?;
    check_range_half_open(record.mean_direction_deg, 0.0, 360.0, "mean_direction_deg")?;
    check_range_half_open(record.near_surface_direction_deg, 0.0, 360.0, "near_surface_direction_deg")?;

    Ok(ParsedRecord::Pnorw(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "102115,090715,1,1,1.23,1.45,1.67,2.34,5.6,6.7,7.8,180.0,20.5,185.0,0.85,15.2,450,2,1,0.12,190.0,0000";

    #[test]
    fn parses_full_sentence() {
        let rec = parse(SAMPLE).unwrap();
        let ParsedRecord::Pnorw(w) = rec else { panic!() };
        assert_eq!(w.hm0_m, Some(1.23));
        assert_eq!(w.peak_direction_deg, Some(180.0));
    }

    #[test]
    fn wrong_field_count_rejected() {
        let err = parse("102115,090715,1,1").unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }

    #[test]
    fn direction_at_360_rejected() {
        let bad = SAMPLE.replacen("180.0", "360.0", 1);
        let err = parse(&bad).unwrap_err();
        assert_eq!(err.code(), "FIELD_RANGE");
    }

    #[test]
    fn invalid_marker_in_optional_field_is_none() {
        let sample = SAMPLE.replacen("1.23", "-9.0", 1);
        let rec = parse(&sample).unwrap();
        let ParsedRecord::Pnorw(w) = rec else { panic!() };
        assert_eq!(w.hm0_m, None);
    }
}
