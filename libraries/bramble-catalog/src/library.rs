//! Playlist, starred and scrobble endpoints.

use crate::client::SubsonicClient;
use crate::error::{CatalogError, Result};
use crate::types::{
    Empty, Playlist, PlaylistPayload, PlaylistSummary, PlaylistsPayload, StarredPayload, Track,
};
use std::collections::HashSet;
use tracing::debug;

impl SubsonicClient {
    /// List the playlists visible to the configured user.
    pub async fn playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let payload: PlaylistsPayload = self.call("getPlaylists", &[]).await?;
        debug!(count = payload.playlists.playlist.len(), "Fetched playlists");
        Ok(payload.playlists.playlist)
    }

    /// Fetch one playlist with its entries.
    pub async fn playlist(&self, id: &str) -> Result<Playlist> {
        let payload: PlaylistPayload = self.call("getPlaylist", &[("id", id)]).await?;
        payload.playlist.ok_or_else(|| {
            CatalogError::ParseError(format!("getPlaylist response for {} has no playlist", id))
        })
    }

    /// Resolve a playlist by exact name: the first listed match wins.
    pub async fn find_playlist(&self, name: &str) -> Result<Playlist> {
        let summary = self
            .playlists()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CatalogError::PlaylistNotFound(name.to_string()))?;

        let playlist = self.playlist(&summary.id).await?;
        debug!(
            id = %playlist.id,
            name = %playlist.name,
            tracks = playlist.tracks.len(),
            "Resolved playlist"
        );
        Ok(playlist)
    }

    /// Ids of every starred song.
    pub async fn starred_ids(&self) -> Result<HashSet<String>> {
        let payload: StarredPayload = self.call("getStarred", &[]).await?;
        Ok(payload.starred.song.into_iter().map(|t| t.id).collect())
    }

    /// Star or unstar a song.
    pub async fn star(&self, track: &Track, starred: bool) -> Result<()> {
        let endpoint = if starred { "star" } else { "unstar" };
        self.call::<Empty>(endpoint, &[("id", &track.id)]).await?;
        debug!(track_id = %track.id, starred, "Updated starred flag");
        Ok(())
    }

    /// Report a play event. `submission = false` marks "now playing".
    pub async fn scrobble(&self, track: &Track, submission: bool) -> Result<()> {
        let submission = if submission { "true" } else { "false" };
        self.call::<Empty>("scrobble", &[("id", &track.id), ("submission", submission)])
            .await?;
        Ok(())
    }
}
