//! `PNORF` — Fourier spectral coefficients, a variable-length sentence
//! whose trailing field count depends on the `num_coefficients` field it
//! declares up front.

use crate::error::ErrorKind;
use crate::fields::{decode_date, decode_numeric, decode_time, decode_uint, DateOrder};
use crate::record::{FourierCoefficient, ParsedRecord, Pnorf};

use super::split_fields_at_least;

const FIXED_FIELDS: usize = 7;

pub fn parse(remainder: &str) -> Result<ParsedRecord, ErrorKind> {
    let f = split_fields_at_least(remainder, FIXED_FIELDS)?;

    let flag = decode_uint(f[0], "flag")? as u8;
    let date = decode_date(f[1], DateOrder::MonthDayYear, "date")?;
    let time = decode_time(f[2], "time")?;
    let basis = decode_uint(f[3], "basis")? as u8;
    let start_freq_hz = decode_numeric(f[4], "start_freq_hz")?.ok_or(ErrorKind::FieldFormat {
        field: "start_freq_hz",
        reason: "frequency origin cannot be absent".into(),
    })?;
    let step_freq_hz = decode_numeric(f[5], "step_freq_hz")?.ok_or(ErrorKind::FieldFormat {
        field: "step_freq_hz",
        reason: "frequency step cannot be absent".into(),
    })?;
    let num_coefficients = decode_uint(f[6], "num_coefficients")? as usize;

    let expected_total = FIXED_FIELDS + 4 * num_coefficients;
    if f.len() != expected_total {
        return Err(ErrorKind::FieldCount { expected: expected_total, actual: f.len() });
    }

    let mut coefficients = Vec::with_capacity(num_coefficients);
    for i in 0..num_coefficients {
        let base = FIXED_FIELDS + 4 * i;
        coefficients.push(FourierCoefficient {
            a1: decode_numeric(f[base], "a1")?,
            b1: decode_numeric(f[base + 1], "b1")?,
            a2: decode_numeric(f[base + 2], "a2")?,
            b2: decode_numeric(f[base + 3], "b2")?,
        });
    }

    Ok(ParsedRecord::Pnorf(Pnorf { flag, date, time, basis, start_freq_hz, step_freq_hz, coefficients }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_coefficient_bins() {
        let rec = parse("0,102115,090715,1,0.0,0.01,2,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8").unwrap();
        let ParsedRecord::Pnorf(p) = rec else { panic!() };
        assert_eq!(p.coefficients.len(), 2);
        assert_eq!(p.coefficients[1].b2, Some(0.8));
    }

    #[test]
    fn invalid_marker_coefficient_is_absent_not_zero() {
        let rec = parse("0,102115,090715,1,0.0,0.01,1,-9.0,0.2,0.3,0.4").unwrap();
        let ParsedRecord::Pnorf(p) = rec else { panic!() };
        assert_eq!(p.coefficients[0].a1, None);
        assert_eq!(p.coefficients[0].b1, Some(0.2));
    }

    #[test]
    fn zero_coefficients_is_valid() {
        let rec = parse("0,102115,090715,1,0.0,0.01,0").unwrap();
        let ParsedRecord::Pnorf(p) = rec else { panic!() };
        assert!(p.coefficients.is_empty());
    }

    #[test]
    fn mismatched_trailing_count_rejected() {
        let err = parse("0,102115,090715,1,0.0,0.01,2,0.1,0.2,0.3,0.4").unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }

    #[test]
    fn too_few_fixed_fields_rejected() {
        let err = parse("0,102115,090715").unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }
}
