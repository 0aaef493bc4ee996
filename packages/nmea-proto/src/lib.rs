//! Wire-level parsing for the instrument's NMEA-0183-style sentence
//! family: checksum framing, field codecs, per-family parsers, and the
//! prefix router that ties them together.
//!
//! `adcp-core` depends on this crate for everything protocol-shaped; it
//! owns no serial I/O, storage, or process structure of its own.

pub mod checksum;
pub mod error;
pub mod fields;
pub mod framer;
pub mod parsers;
pub mod record;
pub mod router;

pub use error::{ErrorKind, ParseError};
pub use framer::{frame_line, frame_one, ChecksummedFrame, MAX_FRAME_LEN};
pub use record::{LatchedConfig, ParsedRecord};
pub use router::{route, route_with_options, ParserOptions};
