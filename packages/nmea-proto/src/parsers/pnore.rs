//! `PNORE` — per-cell echo intensity, four beams.

use crate::error::ErrorKind;
use crate::fields::{decode_date, decode_time, decode_uint, DateOrder};
use crate::record::{ParsedRecord, Pnore};

use super::split_fields;

pub fn parse(remainder: &str) -> Result<ParsedRecord, ErrorKind> {
    let f = split_fields(remainder, 7)?;

    let date = decode_date(f[0], DateOrder::MonthDayYear, "date")?;
    let time = decode_time(f[1], "time")?;
    let cell_number = decode_uint(f[2], "cell_number")? as u16;

    let mut amplitude = [0u8; 4];
    for i in 0..4 {
        let v = decode_uint(f[3 + i], "amplitude")?;
        if v > 255 {
            return Err(ErrorKind::FieldRange { field: "amplitude", reason: format!("{v} outside [0, 255]") });
        }
        amplitude[i] = v as u8;
    }

    Ok(ParsedRecord::Pnore(Pnore { date, time, cell_number, amplitude }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_sentence() {
        let rec = parse("102115,090715,5,120,118,130,125").unwrap();
        let ParsedRecord::Pnore(e) = rec else { panic!() };
        assert_eq!(e.cell_number, 5);
        assert_eq!(e.amplitude, [120, 118, 130, 125]);
    }

    #[test]
    fn amplitude_above_255_rejected() {
        let err = parse("102115,090715,5,256,118,130,125").unwrap_err();
        assert_eq!(err.code(), "FIELD_RANGE");
    }

    #[test]
    fn wrong_field_count_rejected() {
        let err = parse("102115,090715,5,120,118,130").unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }
}
