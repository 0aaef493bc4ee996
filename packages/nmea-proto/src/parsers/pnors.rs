//! `PNORS`..`PNORS4` — sensor / environment snapshot.

use crate::checksum::{checksum, format_checksum};
use crate::error::ErrorKind;
use crate::fields::{
    check_range_half_open, check_range_inclusive, decode_date, decode_hex, decode_numeric, decode_time, DateOrder,
};
use crate::record::{ParsedRecord, Pnors};

use super::{parse_tagged_fields, require_tag, split_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Base,
    S1,
    S2,
    S3,
    S4,
}

fn validate_ranges(r: &Pnors) -> Result<(), ErrorKind> {
    check_range_inclusive(r.battery_v, 0.0, 30.0, "battery_v")?;
    check_range_inclusive(r.sound_speed_mps, 1400.0, 2000.0, "sound_speed_mps")?;
    check_range_half_open(r.heading_deg, 0.0, 360.0, "heading_deg")?;
    check_range_inclusive(r.pitch_deg, -90.0, 90.0, "pitch_deg")?;
    check_range_inclusive(r.roll_deg, -180.0, 180.0, "roll_deg")?;
    check_range_inclusive(r.pressure_dbar, 0.0, 20000.0, "pressure_dbar")?;
    check_range_inclusive(r.temperature_c, -5.0, 50.0, "temperature_c")?;
    Ok(())
}

fn wire_tag(variant: Variant) -> &'static str {
    match variant {
        Variant::Base => "PNORS",
        Variant::S1 => "PNORS1",
        Variant::S2 => "PNORS2",
        Variant::S3 => "PNORS3",
        Variant::S4 => "PNORS4",
    }
}

pub fn parse(remainder: &str, variant: Variant) -> Result<ParsedRecord, ErrorKind> {
    let mut record = match variant {
        Variant::Base => parse_positional_base(remainder)?,
        Variant::S1 => parse_positional_s1(remainder)?,
        Variant::S2 => parse_tagged(remainder, true)?,
        Variant::S3 => parse_tagged(remainder, false)?,
        Variant::S4 => parse_minimal(remainder)?,
    };
    record.wire_variant = wire_tag(variant);
    validate_ranges(&record)?;
    Ok(ParsedRecord::Pnors(record))
}

fn parse_positional_base(remainder: &str) -> Result<Pnors, ErrorKind> {
    let f = split_fields(remainder, 13)?;
    Ok(Pnors {
        date: Some(decode_date(f[0], DateOrder::MonthDayYear, "date")?),
        time: Some(decode_time(f[1], "time")?),
        error_code: Some(decode_hex(f[2], 8, "error_code")?),
        status: Some(decode_hex(f[3], 8, "status")?),
        battery_v: decode_numeric(f[4], "battery_v")?,
        sound_speed_mps: decode_numeric(f[5], "sound_speed_mps")?,
        heading_deg: decode_numeric(f[6], "heading_deg")?,
        pitch_deg: decode_numeric(f[7], "pitch_deg")?,
        roll_deg: decode_numeric(f[8], "roll_deg")?,
        pressure_dbar: decode_numeric(f[9], "pressure_dbar")?,
        temperature_c: decode_numeric(f[10], "temperature_c")?,
        analog_in1: decode_numeric(f[11], "analog_in1")?.map(|v| v as u16),
        analog_in2: decode_numeric(f[12], "analog_in2")?.map(|v| v as u16),
        heading_sd: None,
        pitch_sd: None,
        roll_sd: None,
        pressure_sd: None,
        wire_variant: "PNORS",
    })
}

fn parse_positional_s1(remainder: &str) -> Result<Pnors, ErrorKind> {
    let f = split_fields(remainder, 17)?;
    let mut base = parse_positional_base(&f[..13].join(","))?;
    base.heading_sd = decode_numeric(f[13], "heading_sd")?;
    base.pitch_sd = decode_numeric(f[14], "pitch_sd")?;
    base.roll_sd = decode_numeric(f[15], "roll_sd")?;
    base.pressure_sd = decode_numeric(f[16], "pressure_sd")?;
    Ok(base)
}

fn parse_minimal(remainder: &str) -> Result<Pnors, ErrorKind> {
    let f = split_fields(remainder, 5)?;
    Ok(Pnors {
        date: Some(decode_date(f[0], DateOrder::MonthDayYear, "date")?),
        time: Some(decode_time(f[1], "time")?),
        error_code: None,
        status: None,
        battery_v: None,
        sound_speed_mps: None,
        heading_deg: decode_numeric(f[2], "heading_deg")?,
        pitch_deg: None,
        roll_deg: None,
        pressure_dbar: decode_numeric(f[3], "pressure_dbar")?,
        temperature_c: decode_numeric(f[4], "temperature_c")?,
        analog_in1: None,
        analog_in2: None,
        heading_sd: None,
        pitch_sd: None,
        roll_sd: None,
        pressure_sd: None,
        wire_variant: "PNORS4",
    })
}

/// `PNORS2` (fully tagged) and `PNORS3` (compact-tagged: `EC`/`SC` optional).
fn parse_tagged(remainder: &str, require_error_status: bool) -> Result<Pnors, ErrorKind> {
    let tags = parse_tagged_fields(remainder);

    let date = decode_date(require_tag(&tags, "DATE")?, DateOrder::MonthDayYear, "date")?;
    let time = decode_time(require_tag(&tags, "TIME")?, "time")?;

    let error_code = match tags.get("EC") {
        Some(v) => Some(decode_hex(v, 8, "error_code")?),
        None if require_error_status => return Err(ErrorKind::MissingTag("EC")),
        None => None,
    };
    let status = match tags.get("SC") {
        Some(v) => Some(decode_hex(v, 8, "status")?),
        None if require_error_status => return Err(ErrorKind::MissingTag("SC")),
        None => None,
    };

    let battery_v = decode_numeric(require_tag(&tags, "BV")?, "battery_v")?;
    let sound_speed_mps = decode_numeric(require_tag(&tags, "SS")?, "sound_speed_mps")?;
    let heading_deg = decode_numeric(require_tag(&tags, "H")?, "heading_deg")?;
    let pitch_deg = decode_numeric(require_tag(&tags, "PI")?, "pitch_deg")?;
    let roll_deg = decode_numeric(require_tag(&tags, "R")?, "roll_deg")?;
    let pressure_dbar = decode_numeric(require_tag(&tags, "P")?, "pressure_dbar")?;
    let temperature_c = decode_numeric(require_tag(&tags, "T")?, "temperature_c")?;

    let heading_sd = tags.get("HSD").map(|v| decode_numeric(v, "heading_sd")).transpose()?.flatten();
    let pitch_sd = tags.get("PISD").map(|v| decode_numeric(v, "pitch_sd")).transpose()?.flatten();
    let roll_sd = tags.get("RSD").map(|v| decode_numeric(v, "roll_sd")).transpose()?.flatten();
    let pressure_sd = tags.get("PSD").map(|v| decode_numeric(v, "pressure_sd")).transpose()?.flatten();

    Ok(Pnors {
        date: Some(date),
        time: Some(time),
        error_code,
        status,
        battery_v,
        sound_speed_mps,
        heading_deg,
        pitch_deg,
        roll_deg,
        pressure_dbar,
        temperature_c,
        analog_in1: None,
        analog_in2: None,
        heading_sd,
        pitch_sd,
        roll_sd,
        pressure_sd,
        wire_variant: if require_error_status { "PNORS2" } else { "PNORS3" },
    })
}

impl Pnors {
    /// Renders this record back to `PNORS1` wire form (the superset
    /// variant — the only one guaranteed to carry every field this struct
    /// can hold).
    pub fn to_sentence(&self) -> String {
        fn fmt_opt(v: Option<f64>) -> String {
            v.map(|x| format!("{x}")).unwrap_or_else(|| "-9".to_string())
        }
        fn fmt_opt_u16(v: Option<u16>) -> String {
            v.map(|x| x.to_string()).unwrap_or_else(|| "-9".to_string())
        }
        fn fmt_hex(v: &Option<Vec<u8>>) -> String {
            v.as_ref()
                .map(|bytes| bytes.iter().map(|b| format!("{b:02X}")).collect::<String>())
                .unwrap_or_else(|| "00000000".to_string())
        }

        let payload = format!(
            "PNORS1,{date},{time},{ec},{sc},{bv},{ss},{h},{pi},{r},{p},{t},{a1},{a2},{hsd},{pisd},{rsd},{psd}",
            date = self.date.map(|d| d.format("%m%d%y").to_string()).unwrap_or_default(),
            time = self.time.map(|t| t.format("%H%M%S").to_string()).unwrap_or_default(),
            ec = fmt_hex(&self.error_code),
            sc = fmt_hex(&self.status),
            bv = fmt_opt(self.battery_v),
            ss = fmt_opt(self.sound_speed_mps),
            h = fmt_opt(self.heading_deg),
            pi = fmt_opt(self.pitch_deg),
            r = fmt_opt(self.roll_deg),
            p = fmt_opt(self.pressure_dbar),
            t = fmt_opt(self.temperature_c),
            a1 = fmt_opt_u16(self.analog_in1),
            a2 = fmt_opt_u16(self.analog_in2),
            hsd = fmt_opt(self.heading_sd),
            pisd = fmt_opt(self.pitch_sd),
            rsd = fmt_opt(self.roll_sd),
            psd = fmt_opt(self.pressure_sd),
        );
        let cs = checksum(payload.as_bytes());
        let hex = format_checksum(cs);
        format!("${payload}*{}", std::str::from_utf8(&hex).unwrap())
    }
}
