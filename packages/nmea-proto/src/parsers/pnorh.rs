//! `PNORH3` / `PNORH4` — burst header preceding a batch of per-cell sentences.

use crate::error::ErrorKind;
use crate::fields::{decode_date, decode_hex, decode_time, DateOrder};
use crate::record::{ParsedRecord, Pnorh};

use super::{parse_tagged_fields, require_tag, split_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    H3,
    H4,
}

pub fn parse(remainder: &str, variant: Variant) -> Result<ParsedRecord, ErrorKind> {
    let record = match variant {
        Variant::H3 => parse_tagged(remainder)?,
        Variant::H4 => parse_positional(remainder)?,
    };
    Ok(ParsedRecord::Pnorh(record))
}

fn parse_tagged(remainder: &str) -> Result<Pnorh, ErrorKind> {
    let tags = parse_tagged_fields(remainder);
    Ok(Pnorh {
        date: decode_date(require_tag(&tags, "DATE")?, DateOrder::MonthDayYear, "date")?,
        time: decode_time(require_tag(&tags, "TIME")?, "time")?,
        error_code: decode_hex(require_tag(&tags, "EC")?, 4, "error_code")?,
        status: decode_hex(require_tag(&tags, "STATUS")?, 8, "status")?,
    })
}

fn parse_positional(remainder: &str) -> Result<Pnorh, ErrorKind> {
    let f = split_fields(remainder, 4)?;
    Ok(Pnorh {
        date: decode_date(f[0], DateOrder::MonthDayYear, "date")?,
        time: decode_time(f[1], "time")?,
        error_code: decode_hex(f[2], 4, "error_code")?,
        status: decode_hex(f[3], 8, "status")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_h3() {
        let rec = parse("DATE=102115,TIME=090715,EC=0000,STATUS=2A480000", Variant::H3).unwrap();
        let ParsedRecord::Pnorh(h) = rec else { panic!() };
        assert_eq!(h.status, vec![0x2A, 0x48, 0x00, 0x00]);
    }

    #[test]
    fn parses_positional_h4() {
        let rec = parse("102115,090715,0000,2A480000", Variant::H4).unwrap();
        let ParsedRecord::Pnorh(h) = rec else { panic!() };
        assert_eq!(h.error_code, vec![0x00, 0x00]);
    }

    #[test]
    fn h3_missing_tag_is_rejected() {
        let err = parse("DATE=102115,TIME=090715,STATUS=2A480000", Variant::H3).unwrap_err();
        assert_eq!(err.code(), "MISSING_TAG");
    }

    #[test]
    fn h4_wrong_field_count_is_rejected() {
        let err = parse("102115,090715,0000", Variant::H4).unwrap_err();
        assert_eq!(err.code(), "FIELD_COUNT");
    }
}
