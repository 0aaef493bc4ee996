//! Per-family message parsers.
//!
//! Each submodule exports a pure `parse(remainder, config) -> Result<ParsedRecord, ParseError>`
//! operating on the payload *after* the prefix token has been split off by
//! the router. Two small combinators are shared across families:
//! [`split_fields`] for positional variants (exact arity enforced) and
//! [`parse_tagged_fields`] for `KEY=VALUE` variants (required-key set
//! enforced by each parser).

use std::collections::HashMap;

use crate::error::{ErrorKind, ParseError};
use crate::record::{LatchedConfig, ParsedRecord};
use crate::router::ParserOptions;

pub mod pnora;
pub mod pnorb;
pub mod pnorc;
pub mod pnore;
pub mod pnorf;
pub mod pnorh;
pub mod pnori;
pub mod pnors;
pub mod pnorw;
pub mod pnorwd;

/// Splits a comma-separated positional payload into exactly `expected`
/// fields, failing with `FIELD_COUNT` otherwise.
pub(crate) fn split_fields(remainder: &str, expected: usize) -> Result<Vec<&str>, ErrorKind> {
    let fields: Vec<&str> = if remainder.is_empty() { Vec::new() } else { remainder.split(',').collect() };
    if fields.len() != expected {
        return Err(ErrorKind::FieldCount { expected, actual: fields.len() });
    }
    Ok(fields)
}

/// Splits a comma-separated positional payload with *at least* `min`
/// fields (used by the variable-length `PNORF` sentence).
pub(crate) fn split_fields_at_least(remainder: &str, min: usize) -> Result<Vec<&str>, ErrorKind> {
    let fields: Vec<&str> = if remainder.is_empty() { Vec::new() } else { remainder.split(',').collect() };
    if fields.len() < min {
        return Err(ErrorKind::FieldCount { expected: min, actual: fields.len() });
    }
    Ok(fields)
}

/// Parses a `KEY=VALUE,KEY=VALUE,...` payload into a lookup table. Fields
/// are order-independent.
pub(crate) fn parse_tagged_fields(remainder: &str) -> HashMap<&str, &str> {
    remainder
        .split(',')
        .filter_map(|tok| tok.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect()
}

/// Fetches a required tagged key, failing with `MISSING_TAG` otherwise.
pub(crate) fn require_tag<'a>(tags: &HashMap<&'a str, &'a str>, key: &'static str) -> Result<&'a str, ErrorKind> {
    tags.get(key).copied().ok_or(ErrorKind::MissingTag(key))
}

/// Dispatches a resolved prefix to its family parser.
pub fn dispatch(
    prefix: &'static str,
    remainder: &str,
    config: Option<&LatchedConfig>,
    options: ParserOptions,
) -> Result<ParsedRecord, ParseError> {
    let result = match prefix {
        "PNORI" => pnori::parse(remainder, pnori::Variant::Base, options.max_cells),
        "PNORI1" => pnori::parse(remainder, pnori::Variant::V1, options.max_cells),
        "PNORI2" => pnori::parse(remainder, pnori::Variant::V2, options.max_cells),
        "PNORS" => pnors::parse(remainder, pnors::Variant::Base),
        "PNORS1" => pnors::parse(remainder, pnors::Variant::S1),
        "PNORS2" => pnors::parse(remainder, pnors::Variant::S2),
        "PNORS3" => pnors::parse(remainder, pnors::Variant::S3),
        "PNORS4" => pnors::parse(remainder, pnors::Variant::S4),
        "PNORC" => pnorc::parse(remainder, pnorc::Variant::Base, config),
        "PNORC1" => pnorc::parse(remainder, pnorc::Variant::C1, config),
        "PNORC2" => pnorc::parse(remainder, pnorc::Variant::C2, config),
        "PNORC3" => pnorc::parse(remainder, pnorc::Variant::C3, config),
        "PNORC4" => pnorc::parse(remainder, pnorc::Variant::C4, config),
        "PNORH3" => pnorh::parse(remainder, pnorh::Variant::H3),
        "PNORH4" => pnorh::parse(remainder, pnorh::Variant::H4),
        "PNORA" => pnora::parse(remainder),
        "PNORW" => pnorw::parse(remainder),
        "PNORB" => pnorb::parse(remainder),
        "PNORE" => pnore::parse(remainder),
        "PNORF" => pnorf::parse(remainder),
        "PNORWD" => pnorwd::parse(remainder),
        _ => return Err(ParseError::new(ErrorKind::UnknownPrefix(prefix.to_string()))),
    };
    result.map_err(ParseError::new)
}
