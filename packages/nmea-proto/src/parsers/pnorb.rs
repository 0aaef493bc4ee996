//! `PNORB` — two unrelated record shapes share this prefix: a 14-field
//! wave-band breakdown and an 8-field bottom-tracking reading. Routed by
//! field-count detection, never by guessing at field content (see
//! DESIGN.md for why this prefix is overloaded in the source instrument
//! family).

use crate::error::ErrorKind;
use crate::fields::{decode_date, decode_hex, decode_numeric, decode_time, decode_uint, DateOrder};
use crate::record::{ParsedRecord, PnorbBottomTrack, PnorbWaveBand};

fn split(remainder: &str) -> Vec<&str> {
    if remainder.is_empty() {
        Vec::new()
    } else {
        remainder.split(',').collect()
    }
}

pub fn parse(remainder: &str) -> Result<ParsedRecord, ErrorKind> {
    let fields = split(remainder);
    match fields.len() {
        8 => parse_bottom_track(&fields).map(ParsedRecord::PnorbBottomTrack),
        14 => parse_wave_band(&fields).map(ParsedRecord::PnorbWaveBand),
        n => Err(ErrorKind::FieldCount { expected: 14, actual: n }),
    }
}

fn parse_bottom_track(f: &[&str]) -> Result<PnorbBottomTrack, ErrorKind> {
    let mut beam_range_m = [None; 4];
    for i in 0..4 {
        beam_range_m[i] = decode_numeric(f[2 + i], "beam_range_m")?;
    }
    Ok(PnorbBottomTrack {
        date: decode_date(f[0], DateOrder::MonthDayYear, "date")?,
        time: decode_time(f[1], "time")?,
        beam_range_m,
        quality: decode_uint(f[6], "quality")? as u8,
        status: decode_hex(f[7], 2, "status")?,
    })
}

fn parse_wave_band(f: &[&str]) -> Result<PnorbWaveBand, ErrorKind> {
    Ok(PnorbWaveBand {
        date: decode_date(f[0], DateOrder::MonthDayYear, "date")?,
        time: decode_time(f[1], "time")?,
        band_index: decode_uint(f[2], "band_index")? as u8,
        low_freq_hz: decode_numeric(f[3], "low_freq_hz")?.ok_or(ErrorKind::FieldFormat {
            field: "low_freq_hz",
            reason: "band frequency bound cannot be absent".into(),
        })?,
        high_freq_hz: decode_numeric(f[4], "high_freq_hz")?.ok_or(ErrorKind::FieldFormat {
            field: "high_freq_hz",
            reason: "band frequency bound cannot be absent".into(),
        })?,
        band_hm0_m: decode_numeric(f[5], "band_hm0_m")?,
        band_tm02_s: decode_numeric(f[6], "band_tm02_s")?,
        band_tp_s: decode_numeric(f[7], "band_tp_s")?,
        band_dir_tp_deg: decode_numeric(f[8], "band_dir_tp_deg")?,
        band_spread_deg: decode_numeric(f[9], "band_spread_deg")?,
        band_main_direction_deg: decode_numeric(f[10], "band_main_direction_deg")?,
        energy: decode_numeric(f[11], "energy")?,
        error_code: decode_hex(f[12], 4, "error_code")?,
        num_bands: decode_uint(f[13], "num_bands")? as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_fields_routes_to_bottom_track() {
        let rec = parse("102115,090715,12.3,12.4,12.1,12.2,85,00").unwrap();
        assert!(matches!(rec, ParsedRecord::PnorbBottomTrack(_)));
    }

    #[test]
    fn fourteen_fields_routes_to_wave_band() {
        let rec = parse("102115,090715,0,0.05,0.15,1.23,5.6,6.7,180.0,20.5,185.0,12.3,0000,16").unwrap();
        assert!(matches!(rec, ParsedRecord::PnorbWaveBand(_)));
    }

    #[test]
    fn other_arity_is_field_count_error() {
        let err = parse("102115,090715,1,2,3").unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }

    #[test]
    fn bottom_track_beam_ranges_invalid_marker_aware() {
        let rec = parse("102115,090715,-9.0,12.4,12.1,12.2,85,00").unwrap();
        let ParsedRecord::PnorbBottomTrack(b) = rec else { panic!() };
        assert_eq!(b.beam_range_m[0], None);
    }
}
