//! Error types for the mpv driver

use std::path::PathBuf;
use thiserror::Error;

/// mpv driver errors
#[derive(Debug, Error)]
pub enum MpvError {
    /// The mpv binary could not be started
    #[error("failed to start mpv: {0}")]
    Spawn(#[source] std::io::Error),

    /// The IPC socket never accepted a connection
    #[error("could not connect to mpv at {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Socket read/write failed
    #[error("IPC I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A message could not be encoded or decoded
    #[error("invalid IPC message: {0}")]
    Json(#[from] serde_json::Error),

    /// mpv answered with an error status
    #[error("mpv rejected {command}: {error}")]
    Command { command: String, error: String },

    /// The connection to mpv is gone
    #[error("mpv connection closed")]
    Closed,
}

/// Result type for mpv operations
pub type Result<T> = std::result::Result<T, MpvError>;
