//! Types for the Subsonic REST API requests and responses.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Subsonic REST API version spoken by this client.
pub const API_VERSION: &str = "1.16.1";

/// How credentials are sent to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `t = md5(password + salt)` with a fresh salt per request (API 1.13+)
    #[default]
    Token,

    /// Legacy `p=enc:<hex>`, for servers without token support
    Plain,
}

/// Configuration for connecting to a Subsonic server.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the server (e.g., "https://music.example.com")
    pub url: String,
    pub username: String,
    pub password: String,
    pub auth: AuthMode,
    /// Value sent as the `c` parameter
    pub client_name: String,
}

impl CatalogConfig {
    /// Create a config using token auth and the default client name.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            auth: AuthMode::default(),
            client_name: "bramble".to_string(),
        }
    }

    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}

// =============================================================================
// Library Types
// =============================================================================

/// One playable item as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Server-relative path of the original file
    #[serde(default)]
    pub path: String,
    /// File extension used for the local copy
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default, rename = "track")]
    pub track_number: Option<u32>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u32>,
}

/// A playlist with its ordered entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub song_count: u32,
    #[serde(default)]
    pub duration: u32,
    #[serde(default, rename = "entry")]
    pub tracks: Vec<Track>,
}

/// A playlist as listed by `getPlaylists` (no entries).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub song_count: u32,
}

// =============================================================================
// Response envelope
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(rename = "subsonic-response")]
    pub response: ResponseBody<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseBody<T> {
    pub status: String,
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(flatten)]
    pub payload: T,
}

/// Error object inside a `failed` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

impl<T> Envelope<T> {
    pub(crate) fn into_result(self) -> Result<T> {
        if self.response.status == "ok" {
            return Ok(self.response.payload);
        }

        let error = self.response.error.unwrap_or(ApiError {
            code: 0,
            message: format!("unexpected status {:?}", self.response.status),
        });
        Err(CatalogError::Api {
            code: error.code,
            message: error.message,
        })
    }
}

/// Payload of responses that carry nothing besides the status.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Empty {}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlaylistsPayload {
    #[serde(default)]
    pub playlists: PlaylistsList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlaylistsList {
    #[serde(default)]
    pub playlist: Vec<PlaylistSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlaylistPayload {
    #[serde(default)]
    pub playlist: Option<Playlist>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StarredPayload {
    #[serde(default)]
    pub starred: StarredList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StarredList {
    #[serde(default)]
    pub song: Vec<Track>,
}

/// Older servers send numeric ids.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_playlist_envelope() {
        let body = r#"{
            "subsonic-response": {
                "status": "ok",
                "version": "1.16.1",
                "playlist": {
                    "id": 7,
                    "name": "Road",
                    "songCount": 1,
                    "duration": 200,
                    "entry": [{
                        "id": "t1",
                        "title": "Song",
                        "artist": "Band",
                        "album": "Record",
                        "path": "Band/Record/01.flac",
                        "suffix": "flac",
                        "isVideo": false,
                        "track": 1,
                        "duration": 200
                    }]
                }
            }
        }"#;

        let envelope: Envelope<PlaylistPayload> = serde_json::from_str(body).unwrap();
        let playlist = envelope.into_result().unwrap().playlist.unwrap();
        assert_eq!(playlist.id, "7");
        assert_eq!(playlist.tracks.len(), 1);
        assert_eq!(playlist.tracks[0].suffix, "flac");
        assert_eq!(playlist.tracks[0].track_number, Some(1));
    }

    #[test]
    fn failed_envelope_becomes_api_error() {
        let body = r#"{
            "subsonic-response": {
                "status": "failed",
                "version": "1.16.1",
                "error": { "code": 40, "message": "Wrong username or password" }
            }
        }"#;

        let envelope: Envelope<Empty> = serde_json::from_str(body).unwrap();
        let error = envelope.into_result().unwrap_err();
        assert!(error.is_auth_failure());
    }

    #[test]
    fn empty_playlist_listing() {
        let body = r#"{"subsonic-response": {"status": "ok", "playlists": {}}}"#;
        let envelope: Envelope<PlaylistsPayload> = serde_json::from_str(body).unwrap();
        assert!(envelope.into_result().unwrap().playlists.playlist.is_empty());
    }
}
