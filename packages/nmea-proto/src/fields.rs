//! Primitive NMEA field encodings: invalid-marker-aware numerics, dates,
//! times, and fixed-width hex status codes.

use chrono::{NaiveDate, NaiveTime};

use crate::error::ErrorKind;

/// Any decoded numeric value `<= -9.0` is the instrument's "invalid /
/// unavailable" sentinel (`-9`, `-9.0`, `-9.00`, `-999`, `-9999`, ...) and
/// must surface as `None`, never as a numeric zero or NaN.
const INVALID_MARKER_THRESHOLD: f64 = -9.0;

/// Parses a signed decimal field (optional fractional part), collapsing
/// the instrument's invalid-marker sentinels to `None`.
pub fn decode_numeric(field: &str, name: &'static str) -> Result<Option<f64>, ErrorKind> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Err(ErrorKind::FieldFormat { field: name, reason: "empty field".into() });
    }
    let value: f64 = trimmed.parse().map_err(|_| ErrorKind::FieldFormat {
        field: name,
        reason: format!("{trimmed:?} is not a decimal number"),
    })?;
    if value <= INVALID_MARKER_THRESHOLD {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Parses an unsigned integer field with no invalid-marker handling
/// (counts, indices, hex-adjacent codes never carry the `-9` sentinel).
pub fn decode_uint(field: &str, name: &'static str) -> Result<u64, ErrorKind> {
    field.trim().parse().map_err(|_| ErrorKind::FieldFormat {
        field: name,
        reason: format!("{field:?} is not an unsigned integer"),
    })
}

/// Date field ordering, family-dependent per the instrument's published
/// sentence tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `MMDDYY`
    MonthDayYear,
    /// `YYMMDD`
    YearMonthDay,
}

/// Decodes a 6-digit date field, validating the calendar range. Two-digit
/// years are interpreted as `2000 + yy` (no instrument in this family
/// predates 2000).
pub fn decode_date(field: &str, order: DateOrder, name: &'static str) -> Result<NaiveDate, ErrorKind> {
    let digits = field.trim();
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorKind::FieldFormat {
            field: name,
            reason: format!("{field:?} is not a 6-digit date"),
        });
    }
    let (a, b, c) = (&digits[0..2], &digits[2..4], &digits[4..6]);
    let (year2, month, day) = match order {
        DateOrder::MonthDayYear => (c, a, b),
        DateOrder::YearMonthDay => (a, b, c),
    };
    let year: i32 = 2000 + year2.parse::<i32>().unwrap();
    let month: u32 = month.parse().unwrap();
    let day: u32 = day.parse().unwrap();
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ErrorKind::FieldRange {
        field: name,
        reason: format!("{field:?} is not a valid calendar date"),
    })
}

/// Decodes a 6-digit `HHMMSS` time field, validating the legal range.
pub fn decode_time(field: &str, name: &'static str) -> Result<NaiveTime, ErrorKind> {
    let digits = field.trim();
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorKind::FieldFormat {
            field: name,
            reason: format!("{field:?} is not a 6-digit time"),
        });
    }
    let hour: u32 = digits[0..2].parse().unwrap();
    let minute: u32 = digits[2..4].parse().unwrap();
    let second: u32 = digits[4..6].parse().unwrap();
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| ErrorKind::FieldRange {
        field: name,
        reason: format!("{field:?} is not a valid time of day"),
    })
}

/// Decodes a fixed-width hex field (exactly `width` hex characters) into
/// its raw bytes.
pub fn decode_hex(field: &str, width: usize, name: &'static str) -> Result<Vec<u8>, ErrorKind> {
    let digits = field.trim();
    if digits.len() != width {
        return Err(ErrorKind::FieldFormat {
            field: name,
            reason: format!("expected {width} hex characters, got {}", digits.len()),
        });
    }
    let bytes = digits.as_bytes();
    let mut out = Vec::with_capacity(width / 2 + width % 2);
    let mut chunks = bytes.chunks(2);
    while let Some(chunk) = chunks.next() {
        let (hi, lo) = if chunk.len() == 2 { (chunk[0], chunk[1]) } else { (b'0', chunk[0]) };
        let byte = crate::checksum::parse_hex_byte(hi, lo).ok_or_else(|| ErrorKind::FieldFormat {
            field: name,
            reason: format!("{field:?} is not valid hex"),
        })?;
        out.push(byte);
    }
    Ok(out)
}

/// Checks a decoded value against an inclusive-inclusive range, producing
/// a `FieldRange` error on violation. `None` (invalid marker) values are
/// never range-checked — absence is always valid.
pub fn check_range_inclusive(
    value: Option<f64>,
    min: f64,
    max: f64,
    name: &'static str,
) -> Result<(), ErrorKind> {
    match value {
        None => Ok(()),
        Some(v) if v >= min && v <= max => Ok(()),
        Some(v) => Err(ErrorKind::FieldRange {
            field: name,
            reason: format!("{v} outside [{min}, {max}]"),
        }),
    }
}

/// Checks a decoded value against a half-open `[min, max)` range (used for
/// bearings: `0.0` accepted, `360.0` rejected).
pub fn check_range_half_open(
    value: Option<f64>,
    min: f64,
    max: f64,
    name: &'static str,
) -> Result<(), ErrorKind> {
    match value {
        None => Ok(()),
        Some(v) if v >= min && v < max => Ok(()),
        Some(v) => Err(ErrorKind::FieldRange {
            field: name,
            reason: format!("{v} outside [{min}, {max})"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_marker_variants_collapse_to_absent() {
        for marker in ["-9", "-9.0", "-9.00", "-999", "-9999", "-12.5"] {
            assert_eq!(decode_numeric(marker, "x").unwrap(), None, "marker={marker}");
        }
    }

    #[test]
    fn ordinary_numeric_passes_through() {
        assert_eq!(decode_numeric("275.9", "heading").unwrap(), Some(275.9));
        assert_eq!(decode_numeric("-8.99", "roll").unwrap(), Some(-8.99));
        assert_eq!(decode_numeric("0", "battery").unwrap(), Some(0.0));
    }

    #[test]
    fn date_mmddyy_and_yymmdd() {
        let d = decode_date("102115", DateOrder::MonthDayYear, "date").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2015, 10, 21).unwrap());
        let d2 = decode_date("151021", DateOrder::YearMonthDay, "date").unwrap();
        assert_eq!(d2, NaiveDate::from_ymd_opt(2015, 10, 21).unwrap());
    }

    #[test]
    fn date_rejects_illegal_calendar_values() {
        assert!(decode_date("023015", DateOrder::MonthDayYear, "date").is_err());
    }

    #[test]
    fn time_hhmmss() {
        let t = decode_time("090715", "time").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(9, 7, 15).unwrap());
    }

    #[test]
    fn time_rejects_out_of_range() {
        assert!(decode_time("256000", "time").is_err());
    }

    #[test]
    fn hex_exact_width() {
        assert_eq!(decode_hex("2A480000", 8, "status").unwrap(), vec![0x2A, 0x48, 0x00, 0x00]);
        assert!(decode_hex("2A48", 8, "status").is_err());
    }

    #[test]
    fn heading_boundary_exactly_360_rejected_0_accepted() {
        assert!(check_range_half_open(Some(360.0), 0.0, 360.0, "heading").is_err());
        assert!(check_range_half_open(Some(0.0), 0.0, 360.0, "heading").is_ok());
    }
}
