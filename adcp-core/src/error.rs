//! Operational error kinds that live above the protocol layer: transport
//! and store failures the health interface surfaces, as distinct from
//! the per-frame `nmea_proto::ErrorKind` values persisted to
//! `parse_errors`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serial transport fatal error: {0}")]
    TransportFatal(String),

    #[error("store commit failed after retry: {0}")]
    StoreWrite(String),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// A fatal or informational condition surfaced on `health()` for an
/// external supervisor to observe. The core never exits on its own
/// account for any of these — see spec §7.
#[derive(Debug, Clone)]
pub enum HealthEvent {
    TransportFatal { attempt: u32, detail: String },
    StoreWriteFailed { detail: String },
    FilesystemFatal { detail: String },
}

impl std::fmt::Display for HealthEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthEvent::TransportFatal { attempt, detail } => {
                write!(f, "transport fatal after {attempt} attempts: {detail}")
            }
            HealthEvent::StoreWriteFailed { detail } => write!(f, "store write failed: {detail}"),
            HealthEvent::FilesystemFatal { detail } => write!(f, "filesystem fatal: {detail}"),
        }
    }
}
