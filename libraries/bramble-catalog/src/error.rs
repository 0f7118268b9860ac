//! Error types for the catalog client.

use thiserror::Error;

/// Errors that can occur when talking to a Subsonic catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Server answered with a `failed` Subsonic envelope
    #[error("Subsonic error {code}: {message}")]
    Api { code: u32, message: String },

    /// No playlist with the requested name exists
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Subsonic error code 40: wrong username or password.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, CatalogError::Api { code: 40 | 41, .. })
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
