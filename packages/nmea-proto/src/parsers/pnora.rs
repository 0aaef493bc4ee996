//! `PNORA` — altimeter reading, positional or tagged (format code `201`).

use crate::error::ErrorKind;
use crate::fields::{check_range_inclusive, decode_date, decode_hex, decode_numeric, decode_time, decode_uint, DateOrder};
use crate::record::{ParsedRecord, Pnora};

use super::{parse_tagged_fields, require_tag, split_fields};

/// `PNORA` carries both a positional and a `KEY=VALUE` form under the same
/// prefix; the tagged form is distinguished by the presence of `=` in its
/// first field, same heuristic the router leaves to each family.
pub fn parse(remainder: &str) -> Result<ParsedRecord, ErrorKind> {
    let record = if remainder.contains('=') { parse_tagged(remainder)? } else { parse_positional(remainder)? };
    check_range_inclusive(record.distance_m, 0.0, 1000.0, "distance_m")?;
    Ok(ParsedRecord::Pnora(record))
}

fn parse_positional(remainder: &str) -> Result<Pnora, ErrorKind> {
    let f = split_fields(remainder, 8)?;
    Ok(Pnora {
        date: decode_date(f[0], DateOrder::MonthDayYear, "date")?,
        time: decode_time(f[1], "time")?,
        pressure_dbar: decode_numeric(f[2], "pressure_dbar")?,
        distance_m: decode_numeric(f[3], "distance_m")?,
        quality: decode_uint(f[4], "quality")? as u8,
        status: decode_hex(f[5], 2, "status")?,
        pitch_deg: decode_numeric(f[6], "pitch_deg")?,
        roll_deg: decode_numeric(f[7], "roll_deg")?,
    })
}

fn parse_tagged(remainder: &str) -> Result<Pnora, ErrorKind> {
    let tags = parse_tagged_fields(remainder);
    Ok(Pnora {
        date: decode_date(require_tag(&tags, "DATE")?, DateOrder::MonthDayYear, "date")?,
        time: decode_time(require_tag(&tags, "TIME")?, "time")?,
        pressure_dbar: decode_numeric(require_tag(&tags, "P")?, "pressure_dbar")?,
        distance_m: decode_numeric(require_tag(&tags, "D")?, "distance_m")?,
        quality: decode_uint(require_tag(&tags, "Q")?, "quality")? as u8,
        status: decode_hex(require_tag(&tags, "STATUS")?, 2, "status")?,
        pitch_deg: decode_numeric(require_tag(&tags, "PI")?, "pitch_deg")?,
        roll_deg: decode_numeric(require_tag(&tags, "R")?, "roll_deg")?,
    })
}
