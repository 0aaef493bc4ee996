//! `PNORWD` — one directional spectrum bin.

use crate::error::ErrorKind;
use crate::fields::{check_range_half_open, decode_numeric};
use crate::record::{ParsedRecord, Pnorwd};

use super::split_fields;

pub fn parse(remainder: &str) -> Result<ParsedRecord, ErrorKind> {
    let f = split_fields(remainder, 4)?;

    let freq_bin_hz = decode_numeric(f[0], "freq_bin_hz")?.ok_or(ErrorKind::FieldFormat {
        field: "freq_bin_hz",
        reason: "bin frequency cannot be absent".into(),
    })?;
    let direction_deg = decode_numeric(f[1], "direction_deg")?.ok_or(ErrorKind::FieldFormat {
        field: "direction_deg",
        reason: "bin direction cannot be absent".into(),
    })?;
    check_range_half_open(Some(direction_deg), 0.0, 360.0, "direction_deg")?;
    let spread_deg = decode_numeric(f[2], "spread_deg")?;
    let energy = decode_numeric(f[3], "energy")?;

    Ok(ParsedRecord::Pnorwd(Pnorwd { freq_bin_hz, direction_deg, spread_deg, energy }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_bin() {
        let rec = parse("0.05,185.0,20.5,12.3").unwrap();
        let ParsedRecord::Pnorwd(b) = rec else { panic!() };
        assert_eq!(b.direction_deg, 185.0);
        assert_eq!(b.spread_deg, Some(20.5));
        assert_eq!(b.energy, Some(12.3));
    }

    #[test]
    fn invalid_marker_energy_is_absent_not_zero() {
        let rec = parse("0.05,185.0,20.5,-9.0").unwrap();
        let ParsedRecord::Pnorwd(b) = rec else { panic!() };
        assert_eq!(b.energy, None);
    }

    #[test]
    fn direction_at_360_rejected() {
        let err = parse("0.05,360.0,20.5,12.3").unwrap_err();
        assert_eq!(err.code(), "FIELD_RANGE");
    }

    #[test]
    fn wrong_field_count_rejected() {
        let err = parse("0.05,185.0,20.5").unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }
}
