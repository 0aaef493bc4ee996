//! `PNORI` / `PNORI1` / `PNORI2` — instrument configuration.

use crate::checksum::{checksum, format_checksum};
use crate::error::ErrorKind;
use crate::fields::{decode_numeric, decode_uint};
use crate::record::{CoordSystem, ParsedRecord, Pnori};

use super::split_fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Base,
    V1,
    V2,
}

fn decode_coord_system(field: &str) -> Result<CoordSystem, ErrorKind> {
    match field.trim() {
        "0" => Ok(CoordSystem::Enu),
        "1" => Ok(CoordSystem::Xyz),
        "2" => Ok(CoordSystem::Beam),
        other => Err(ErrorKind::FieldFormat {
            field: "coord_system",
            reason: format!("{other:?} is not one of 0 (ENU), 1 (XYZ), 2 (BEAM)"),
        }),
    }
}

fn encode_coord_system(c: CoordSystem) -> &'static str {
    match c {
        CoordSystem::Enu => "0",
        CoordSystem::Xyz => "1",
        CoordSystem::Beam => "2",
    }
}

pub fn parse(remainder: &str, variant: Variant, max_cells: u16) -> Result<ParsedRecord, ErrorKind> {
    let expected = match variant {
        Variant::Base => 7,
        Variant::V1 => 8,
        Variant::V2 => 9,
    };
    let f = split_fields(remainder, expected)?;

    let instrument_type = decode_uint(f[0], "instrument_type")? as u8;
    if !matches!(instrument_type, 0 | 2 | 4) {
        return Err(ErrorKind::FieldRange {
            field: "instrument_type",
            reason: format!("{instrument_type} is not one of 0, 2, 4"),
        });
    }

    let head_id = f[1].to_string();
    if head_id.chars().count() > 30 {
        return Err(ErrorKind::FieldRange { field: "head_id", reason: "longer than 30 characters".into() });
    }

    let num_beams = decode_uint(f[2], "num_beams")? as u8;
    if !(1..=4).contains(&num_beams) {
        return Err(ErrorKind::FieldRange { field: "num_beams", reason: format!("{num_beams} outside 1..=4") });
    }
    if instrument_type == 4 && num_beams != 4 {
        return Err(ErrorKind::FieldRange {
            field: "num_beams",
            reason: "instrument_type 4 requires num_beams == 4".into(),
        });
    }

    let num_cells = decode_uint(f[3], "num_cells")? as u16;
    if num_cells < 1 || num_cells > max_cells {
        return Err(ErrorKind::FieldRange {
            field: "num_cells",
            reason: format!("{num_cells} outside 1..={max_cells}"),
        });
    }

    let blanking_m = decode_numeric(f[4], "blanking_m")?.ok_or(ErrorKind::FieldFormat {
        field: "blanking_m",
        reason: "blanking distance cannot be absent".into(),
    })?;
    if !(blanking_m > 0.0 && blanking_m <= 100.0) {
        return Err(ErrorKind::FieldRange { field: "blanking_m", reason: format!("{blanking_m} outside (0, 100]") });
    }

    let cell_size_m = decode_numeric(f[5], "cell_size_m")?.ok_or(ErrorKind::FieldFormat {
        field: "cell_size_m",
        reason: "cell size cannot be absent".into(),
    })?;
    if !(cell_size_m > 0.0 && cell_size_m <= 100.0) {
        return Err(ErrorKind::FieldRange { field: "cell_size_m", reason: format!("{cell_size_m} outside (0, 100]") });
    }

    let coord_system = decode_coord_system(f[6])?;

    let (firmware_version, serial_number, head_frequency_khz) = match variant {
        Variant::Base => (None, None, None),
        Variant::V1 => (Some(f[7].to_string()), None, None),
        Variant::V2 => (
            None,
            Some(f[7].to_string()),
            Some(decode_uint(f[8], "head_frequency_khz")? as u16),
        ),
    };

    Ok(ParsedRecord::Pnori(Pnori {
        instrument_type,
        head_id,
        num_beams,
        num_cells,
        blanking_m,
        cell_size_m,
        coord_system,
        firmware_version,
        serial_number,
        head_frequency_khz,
    }))
}

impl Pnori {
    /// Renders this record back to its `PNORI`/`PNORI1`/`PNORI2` wire
    /// sentence (whichever the record's optional fields select), with a
    /// freshly computed checksum.
    pub fn to_sentence(&self) -> String {
        let tag = match (&self.firmware_version, &self.serial_number) {
            (Some(_), _) => "1",
            (None, Some(_)) => "2",
            (None, None) => "",
        };
        let mut payload = format!(
            "PNORI{tag},{t},{id},{b},{c},{bl:.2},{cs:.2},{coord}",
            t = self.instrument_type,
            id = self.head_id,
            b = self.num_beams,
            c = self.num_cells,
            bl = self.blanking_m,
            cs = self.cell_size_m,
            coord = encode_coord_system(self.coord_system),
        );
        if let Some(fw) = &self.firmware_version {
            payload.push(',');
            payload.push_str(fw);
        }
        if let Some(sn) = &self.serial_number {
            payload.push(',');
            payload.push_str(sn);
            payload.push(',');
            payload.push_str(&self.head_frequency_khz.unwrap_or_default().to_string());
        }
        let cs = checksum(payload.as_bytes());
        let hex = format_checksum(cs);
        format!("${payload}*{}", std::str::from_utf8(&hex).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_variant() {
        let record = parse("4,Signature1000900001,4,20,0.20,1.00,0", Variant::Base, 1000).unwrap();
        let ParsedRecord::Pnori(p) = record else { panic!("wrong variant") };
        assert_eq!(p.instrument_type, 4);
        assert_eq!(p.head_id, "Signature1000900001");
        assert_eq!(p.num_beams, 4);
        assert_eq!(p.num_cells, 20);
        assert_eq!(p.coord_system, CoordSystem::Enu);
    }

    #[test]
    fn type_4_requires_4_beams() {
        let err = parse("4,X,3,20,0.20,1.00,0", Variant::Base, 1000).unwrap_err();
        assert_eq!(err.code(), "FIELD_RANGE");
    }

    #[test]
    fn cell_count_respects_configured_upper_bound() {
        assert!(parse("0,X,2,128,0.20,1.00,0", Variant::Base, 128).is_ok());
        assert!(parse("0,X,2,129,0.20,1.00,0", Variant::Base, 128).is_err());
        assert!(parse("0,X,2,129,0.20,1.00,0", Variant::Base, 1000).is_ok());
    }

    #[test]
    fn round_trips_through_serializer() {
        let record = parse("4,Sig1000,4,20,0.20,1.00,0", Variant::Base, 1000).unwrap();
        let ParsedRecord::Pnori(p) = record else { panic!() };
        let sentence = p.to_sentence();

        let frame = crate::framer::frame_line(sentence.as_bytes(), false).unwrap();
        let reparsed = crate::router::route(&frame, None).unwrap();
        assert_eq!(reparsed, ParsedRecord::Pnori(p));
    }
}
