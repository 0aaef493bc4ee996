//! Static prefix → parser dispatch table.
//!
//! Keyed by the token between `$` and the first comma, case-sensitive.
//! Longer prefixes win (`PNORI2` matches before `PNORI1` before `PNORI`).
//! The router holds no state; it is a pure lookup plus dispatch.

use crate::error::{ErrorKind, ParseError};
use crate::framer::ChecksummedFrame;
use crate::record::{LatchedConfig, ParsedRecord};

/// Tunables that affect parsing but aren't part of the wire format itself.
///
/// `max_cells` resolves the disagreement between the published instrument
/// spec (`1..1000`) and an older in-source implementation (`1..128`): the
/// former is normative and is the default, but a deployment can opt into
/// the stricter historical bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParserOptions {
    pub max_cells: u16,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_cells: 1000 }
    }
}

/// All prefixes this router recognizes, longest first so a linear
/// starts_with scan picks the most specific match.
const PREFIXES: &[&str] = &[
    "PNORI2", "PNORI1", "PNORI",
    "PNORS4", "PNORS3", "PNORS2", "PNORS1", "PNORS",
    "PNORC4", "PNORC3", "PNORC2", "PNORC1", "PNORC",
    "PNORH4", "PNORH3",
    "PNORA",
    "PNORW",
    "PNORB",
    "PNORE",
    "PNORF",
    "PNORWD",
];

/// Splits the payload's leading prefix token off from the rest (the part
/// after the first comma, or everything if there is no comma — `PNORF`
/// can legally have no fields beyond the prefix only in the degenerate
/// `N=0` case, but every real sentence has at least one comma).
fn split_prefix(payload: &str) -> (&str, &str) {
    match payload.find(',') {
        Some(idx) => (&payload[..idx], &payload[idx + 1..]),
        None => (payload, ""),
    }
}

/// Looks up the registered prefix for a payload's leading token, applying
/// the longest-prefix-wins rule (so `PNORI2,...` is not mistaken for
/// `PNORI` with a literal `2` glued to it — the token itself must match
/// exactly, not just start with a registered prefix).
fn resolve_prefix(token: &str) -> Option<&'static str> {
    PREFIXES.iter().copied().find(|&p| p == token)
}

/// Parses a checksum-validated frame into a strongly typed record,
/// dispatching on its prefix. `config` is the latched PNORI snapshot used
/// by cell-indexed parsers for cross-sentence validation.
pub fn route(frame: &ChecksummedFrame, config: Option<&LatchedConfig>) -> Result<ParsedRecord, ParseError> {
    route_with_options(frame, config, ParserOptions::default())
}

/// Like [`route`], but with explicit [`ParserOptions`].
pub fn route_with_options(
    frame: &ChecksummedFrame,
    config: Option<&LatchedConfig>,
    options: ParserOptions,
) -> Result<ParsedRecord, ParseError> {
    let payload = frame.payload_str().map_err(ParseError::new)?;
    let (token, remainder) = split_prefix(payload);

    let Some(prefix) = resolve_prefix(token) else {
        return Err(ParseError::new(ErrorKind::UnknownPrefix(token.to_string())));
    };

    crate::parsers::dispatch(prefix, remainder, config, options).map_err(|e| e.with_prefix(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_prefix_wins_over_shorter() {
        assert_eq!(resolve_prefix("PNORI2"), Some("PNORI2"));
        assert_eq!(resolve_prefix("PNORI"), Some("PNORI"));
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert_eq!(resolve_prefix("GPGGA"), None);
    }

    #[test]
    fn split_prefix_handles_missing_comma() {
        assert_eq!(split_prefix("PNORI"), ("PNORI", ""));
        assert_eq!(split_prefix("PNORI,1,2"), ("PNORI", "1,2"));
    }
}
