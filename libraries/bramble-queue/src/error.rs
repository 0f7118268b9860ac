//! Error types for queue management

use bramble_catalog::{CatalogError, Track};
use thiserror::Error;

/// Why a track could not be materialized locally
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The catalog could not deliver the bytes
    #[error("transfer failed: {0}")]
    Transfer(#[source] CatalogError),

    /// The bytes could not be written to the download directory
    #[error("could not write local file: {0}")]
    Write(#[source] std::io::Error),

    /// The background download task panicked or was cancelled
    #[error("download task aborted: {0}")]
    Aborted(String),
}

/// Queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Playlist resolution or reload failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The playlist resolved but has nothing to play
    #[error("playlist {0:?} has no playable tracks")]
    NotPlayable(String),

    /// A track needed now could not be fetched
    #[error("could not fetch {title:?} ({track_id}): {source}")]
    Fetch {
        track_id: String,
        title: String,
        #[source]
        source: FetchFailure,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The queue has been cleaned up
    #[error("queue is closed")]
    Closed,
}

impl QueueError {
    pub(crate) fn fetch(track: &Track, source: FetchFailure) -> Self {
        QueueError::Fetch {
            track_id: track.id.clone(),
            title: track.title.clone(),
            source,
        }
    }
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
