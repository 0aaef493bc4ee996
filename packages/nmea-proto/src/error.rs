//! Error kinds surfaced while framing and parsing a single sentence.
//!
//! These are the kinds that end up as rows in the `parse_errors` table
//! (see the embedded store). Transport and store-level failures
//! (`TRANSPORT_TIMEOUT`, `TRANSPORT_FATAL`, `STORE_WRITE`) are operational
//! events owned by `adcp-core`, not protocol-level parse errors, and are
//! not represented here.

use std::fmt;

/// One structured error kind per failure mode a frame can hit on the way
/// from raw bytes to a `ParsedRecord`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("no '*' found before frame end")]
    ChecksumMissing,

    #[error("'*' not followed by two hex digits")]
    ChecksumMalformed,

    #[error("checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("no parser registered for prefix {0:?}")]
    UnknownPrefix(String),

    #[error("wrong field count: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("could not decode field {field:?}: {reason}")]
    FieldFormat { field: &'static str, reason: String },

    #[error("field {field:?} out of range: {reason}")]
    FieldRange { field: &'static str, reason: String },

    #[error("tagged variant missing required key {0:?}")]
    MissingTag(&'static str),

    #[error("frame exceeded maximum length of {max} bytes")]
    Oversized { max: usize },

    #[error("entered binary-capture mode")]
    BinaryModeEntry,

    #[error("exited binary-capture mode")]
    BinaryModeExit,
}

impl ErrorKind {
    /// The stable string stored in `parse_errors.error_kind`.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ChecksumMissing => "CHECKSUM_MISSING",
            ErrorKind::ChecksumMalformed => "CHECKSUM_MALFORMED",
            ErrorKind::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
            ErrorKind::UnknownPrefix(_) => "UNKNOWN_PREFIX",
            ErrorKind::FieldCount { .. } => "FIELD_COUNT",
            ErrorKind::FieldFormat { .. } => "FIELD_FORMAT",
            ErrorKind::FieldRange { .. } => "FIELD_RANGE",
            ErrorKind::MissingTag(_) => "MISSING_TAG",
            ErrorKind::Oversized { .. } => "OVERSIZED",
            ErrorKind::BinaryModeEntry => "BINARY_MODE_ENTRY",
            ErrorKind::BinaryModeExit => "BINARY_MODE_EXIT",
        }
    }
}

/// A parse failure for one frame, carrying enough context to persist a
/// `parse_errors` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub attempted_prefix: Option<String>,
}

impl ParseError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, attempted_prefix: None }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attempted_prefix = Some(prefix.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
