//! Fault injection: flips a stated checksum so the receiver's framer hits
//! `CHECKSUM_MISMATCH`, and synthesizes binary-noise bursts so the
//! receiver's mode detector has something real to trip on.

use rand::Rng;

/// Corrupts the two trailing checksum hex digits of an otherwise
/// well-formed `$...*HH` sentence, leaving the rest of the frame intact.
pub fn corrupt_checksum(sentence: &str) -> String {
    let bytes = sentence.as_bytes();
    let mut out = bytes.to_vec();
    let len = out.len();
    if len >= 2 {
        out[len - 1] = if out[len - 1] == b'0' { b'1' } else { b'0' };
    }
    String::from_utf8(out).unwrap_or_else(|_| sentence.to_string())
}

/// A burst of bytes outside the printable-ASCII range a real instrument
/// would never emit in NMEA mode, sized to comfortably trip the
/// consumer's binary-mode detector threshold on its own.
pub fn binary_noise_burst(rng: &mut impl Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0x80u8..=0xFF)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_checksum_changes_the_trailing_digit() {
        let sentence = "$PNORWD,0.05,185.0,20.5,12.3*5A";
        let corrupted = corrupt_checksum(sentence);
        assert_ne!(sentence, corrupted);
        assert_eq!(sentence.len(), corrupted.len());
    }

    #[test]
    fn binary_noise_burst_is_all_high_bytes() {
        let mut rng = rand::thread_rng();
        let burst = binary_noise_burst(&mut rng, 200);
        assert_eq!(burst.len(), 200);
        assert!(burst.iter().all(|&b| b >= 0x80));
    }
}
