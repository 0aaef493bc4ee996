//! Locates `$`-delimited NMEA frames within a raw line and validates their
//! checksum. Line boundaries (CR/LF/CRLF) only decide how the transport
//! chunks reads; framing itself never relies on them — a frame is
//! complete exactly when `*hh` is found following the nearest preceding
//! `$`, wherever that falls inside the chunk.

use crate::checksum::{checksum as xor_checksum, format_checksum, parse_hex_byte};
use crate::error::{ErrorKind, ParseError};

/// Maximum frame length: the span from `$` through the two checksum hex
/// digits, inclusive.
pub const MAX_FRAME_LEN: usize = 2048;

/// A frame whose checksum has been located and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksummedFrame {
    /// Bytes strictly between `$` and `*` (the prefix + comma-separated
    /// or tagged field payload).
    pub payload: Vec<u8>,
    /// The two stated checksum hex characters, uppercased.
    pub stated_checksum: [u8; 2],
}

impl ChecksummedFrame {
    /// Payload as `&str`, if it is valid ASCII (it always should be —
    /// binary-mode detection runs upstream of the framer).
    pub fn payload_str(&self) -> Result<&str, ErrorKind> {
        std::str::from_utf8(&self.payload).map_err(|_| ErrorKind::FieldFormat {
            field: "payload",
            reason: "payload is not valid UTF-8".into(),
        })
    }

    /// Re-renders this frame as a wire-format sentence (`$...*HH`), used
    /// by the round-trip tests and by serializers.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 4);
        out.push(b'$');
        out.extend_from_slice(&self.payload);
        out.push(b'*');
        out.extend_from_slice(&self.stated_checksum);
        out
    }
}

/// Frames one raw line (already chunked by the transport, `<= MAX_FRAME_LEN`
/// bytes unless `truncated` is set because the transport had to cut the
/// read off at the cap without finding a terminator).
///
/// This only ever looks at the first frame in `bytes` — use [`frame_one`]
/// instead when the chunk may hold more than one `$...*HH` frame back to
/// back with no terminator between them (spec §4.1: framing never relies
/// on line terminators, so that case is routine, not malformed input).
pub fn frame_line(bytes: &[u8], truncated: bool) -> Result<ChecksummedFrame, ParseError> {
    frame_one(bytes, truncated).0
}

/// Like [`frame_line`], but also reports how many leading bytes of `bytes`
/// the attempt consumed, so a caller can slice `&bytes[consumed..]` and
/// call again to recover any further frames packed into the same chunk.
/// `consumed` is always in `1..=bytes.len()` for non-empty input, so a
/// caller that stops once the slice is empty is guaranteed to terminate.
pub fn frame_one(bytes: &[u8], truncated: bool) -> (Result<ChecksummedFrame, ParseError>, usize) {
    let Some(dollar) = bytes.iter().position(|&b| b == b'$') else {
        return (Err(ParseError::new(ErrorKind::ChecksumMissing)), bytes.len());
    };
    let rest = &bytes[dollar + 1..];

    let Some(star_rel) = rest.iter().position(|&b| b == b'*') else {
        if truncated {
            return (Err(ParseError::new(ErrorKind::Oversized { max: MAX_FRAME_LEN })), bytes.len());
        }
        return (Err(ParseError::new(ErrorKind::ChecksumMissing)), bytes.len());
    };

    let payload = &rest[..star_rel];
    let after_star = &rest[star_rel + 1..];
    // Bytes this attempt accounts for regardless of outcome: everything up
    // through the '$', the payload, the '*', and (if present) two more for
    // the stated checksum digits.
    let consumed_through_star = dollar + 1 + payload.len() + 1;

    if after_star.len() < 2 {
        if truncated {
            return (Err(ParseError::new(ErrorKind::Oversized { max: MAX_FRAME_LEN })), bytes.len());
        }
        return (Err(ParseError::new(ErrorKind::ChecksumMalformed)), bytes.len());
    }

    let consumed = consumed_through_star + 2;
    let (hi, lo) = (after_star[0], after_star[1]);
    let Some(stated) = parse_hex_byte(hi, lo) else {
        return (Err(ParseError::new(ErrorKind::ChecksumMalformed)), consumed);
    };

    // Measured from '$' to the checksum's last hex digit, excluding any
    // garbage the scan skipped before '$'.
    let measured_len = 1 + payload.len() + 1 + 2;
    if measured_len > MAX_FRAME_LEN {
        return (Err(ParseError::new(ErrorKind::Oversized { max: MAX_FRAME_LEN })), consumed);
    }

    let actual = xor_checksum(payload);
    let stated_hex = [hi.to_ascii_uppercase(), lo.to_ascii_uppercase()];
    if actual != stated {
        return (
            Err(ParseError::new(ErrorKind::ChecksumMismatch {
                expected: String::from_utf8_lossy(&stated_hex).into_owned(),
                actual: String::from_utf8_lossy(&format_checksum(actual)).into_owned(),
            })),
            consumed,
        );
    }

    (Ok(ChecksummedFrame { payload: payload.to_vec(), stated_checksum: stated_hex }), consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(payload: &str) -> Vec<u8> {
        let cs = xor_checksum(payload.as_bytes());
        let hex = format_checksum(cs);
        let mut s = format!("${payload}*").into_bytes();
        s.extend_from_slice(&hex);
        s
    }

    #[test]
    fn frames_a_valid_sentence() {
        let line = build("PNORS4,102115,090715,275.9,15.7,22.45");
        let frame = frame_line(&line, false).unwrap();
        assert_eq!(frame.payload_str().unwrap(), "PNORS4,102115,090715,275.9,15.7,22.45");
    }

    #[test]
    fn discards_garbage_before_dollar() {
        let mut line = b"\x01\x02garbage".to_vec();
        line.extend_from_slice(&build("PNORWD,1.0,2.0,3.0,4.0"));
        let frame = frame_line(&line, false).unwrap();
        assert_eq!(frame.payload_str().unwrap(), "PNORWD,1.0,2.0,3.0,4.0");
    }

    #[test]
    fn missing_star_is_checksum_missing() {
        let line = b"$PNORS4,102115,090715,275.9";
        let err = frame_line(line, false).unwrap_err();
        assert_eq!(err.kind.code(), "CHECKSUM_MISSING");
    }

    #[test]
    fn star_without_two_hex_is_malformed() {
        let line = b"$PNORS4,102115*A";
        let err = frame_line(line, false).unwrap_err();
        assert_eq!(err.kind.code(), "CHECKSUM_MALFORMED");
    }

    #[test]
    fn mismatched_checksum_reports_expected_and_actual() {
        // Flip the stated checksum to a different but still-valid hex pair
        // so this exercises the mismatch branch rather than CHECKSUM_MALFORMED
        // (a non-hex stated checksum, e.g. "XX", is a distinct failure mode).
        let mut line = build("PNORC,102115,090715,1,12.34,56.78,90.12");
        let n = line.len();
        let wrong = if line[n - 2] == b'0' { b'1' } else { b'0' };
        line[n - 2] = wrong;
        let err = frame_line(&line, false).unwrap_err();
        assert_eq!(err.kind.code(), "CHECKSUM_MISMATCH");
        match err.kind {
            ErrorKind::ChecksumMismatch { expected, .. } => assert_eq!(expected.as_bytes()[0], wrong),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn non_hex_stated_checksum_is_malformed_not_mismatch() {
        let mut line = build("PNORC,102115,090715,1,12.34,56.78,90.12");
        let n = line.len();
        line[n - 2] = b'X';
        line[n - 1] = b'X';
        let err = frame_line(&line, false).unwrap_err();
        assert_eq!(err.kind.code(), "CHECKSUM_MALFORMED");
    }

    #[test]
    fn exactly_2048_byte_frame_parses() {
        // payload length chosen so '$' + payload + '*' + 2 hex == 2048
        let payload_len = MAX_FRAME_LEN - 4;
        let payload = "A".repeat(payload_len);
        let line = build(&payload);
        assert_eq!(line.len(), MAX_FRAME_LEN);
        assert!(frame_line(&line, false).is_ok());
    }

    #[test]
    fn oversized_frame_errors() {
        let payload_len = MAX_FRAME_LEN - 3; // one byte too long overall
        let payload = "A".repeat(payload_len);
        let line = build(&payload);
        assert_eq!(line.len(), MAX_FRAME_LEN + 1);
        let err = frame_line(&line, false).unwrap_err();
        assert_eq!(err.kind.code(), "OVERSIZED");
    }

    #[test]
    fn truncated_line_without_terminator_is_oversized() {
        let mut line = b"$PNORS4,102115,090715,275.9,15.7".to_vec();
        line.extend(std::iter::repeat(b'9').take(MAX_FRAME_LEN));
        let err = frame_line(&line, true).unwrap_err();
        assert_eq!(err.kind.code(), "OVERSIZED");
    }

    #[test]
    fn frame_one_recovers_two_frames_with_no_terminator_between_them() {
        let mut line = build("PNORWD,1.0,2.0,3.0,4.0");
        line.extend_from_slice(&build("PNORWD,5.0,6.0,7.0,8.0"));

        let (first, consumed) = frame_one(&line, false);
        assert_eq!(first.unwrap().payload_str().unwrap(), "PNORWD,1.0,2.0,3.0,4.0");

        let (second, consumed2) = frame_one(&line[consumed..], false);
        assert_eq!(second.unwrap().payload_str().unwrap(), "PNORWD,5.0,6.0,7.0,8.0");
        assert_eq!(consumed + consumed2, line.len());
    }

    #[test]
    fn frame_one_skips_a_malformed_frame_and_still_recovers_the_next() {
        let mut line = build("PNORC,102115,090715,1,12.34,56.78,90.12");
        let n = line.len();
        line[n - 1] = if line[n - 1] == b'0' { b'1' } else { b'0' }; // flip the checksum
        line.extend_from_slice(&build("PNORWD,1.0,2.0,3.0,4.0"));

        let (first, consumed) = frame_one(&line, false);
        assert_eq!(first.unwrap_err().kind.code(), "CHECKSUM_MISMATCH");

        let (second, _) = frame_one(&line[consumed..], false);
        assert_eq!(second.unwrap().payload_str().unwrap(), "PNORWD,1.0,2.0,3.0,4.0");
    }
}
