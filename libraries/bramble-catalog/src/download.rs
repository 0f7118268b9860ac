//! Track download.

use crate::client::SubsonicClient;
use crate::error::{CatalogError, Result};
use crate::types::{Empty, Envelope, Track};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

impl SubsonicClient {
    /// Download the original file of a track.
    ///
    /// The server reports errors on this endpoint as a JSON envelope with a
    /// 200 status, so a JSON content type is treated as an error body.
    pub async fn download(&self, track: &Track) -> Result<Bytes> {
        debug!(track_id = %track.id, title = %track.title, "Downloading track");

        let response = self.send("download", &[("id", &track.id)]).await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("json"));

        if is_json {
            let envelope: Envelope<Empty> = response.json().await.map_err(|e| {
                CatalogError::ParseError(format!("Failed to parse download error: {}", e))
            })?;
            envelope.into_result()?;
            return Err(CatalogError::ParseError(format!(
                "download of {} returned JSON instead of audio",
                track.id
            )));
        }

        let bytes = response.bytes().await?;
        info!(track_id = %track.id, size = bytes.len(), "Track downloaded");
        Ok(bytes)
    }
}
