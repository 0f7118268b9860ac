//! The catalog seam consumed by the queue engine.

use crate::client::SubsonicClient;
use crate::error::Result;
use crate::types::{Playlist, Track};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;

/// Remote media catalog
///
/// Everything the queue engine and the scrobbler need from the server.
/// `SubsonicClient` is the real implementation; tests substitute fakes.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve a playlist name to its ordered track list
    ///
    /// # Errors
    /// `CatalogError::PlaylistNotFound` if no playlist has that exact name
    async fn resolve_playlist(&self, name: &str) -> Result<Playlist>;

    /// Fetch the raw audio bytes of a track
    async fn fetch_bytes(&self, track: &Track) -> Result<Bytes>;

    /// Ids of all starred tracks
    async fn starred(&self) -> Result<HashSet<String>>;

    /// Set or clear the starred flag of a track
    async fn set_starred(&self, track: &Track, starred: bool) -> Result<()>;

    /// Report that a track started playing
    async fn report_now_playing(&self, track: &Track) -> Result<()>;

    /// Report that a track was played (counts as a play)
    async fn report_completed(&self, track: &Track) -> Result<()>;
}

#[async_trait]
impl Catalog for SubsonicClient {
    async fn resolve_playlist(&self, name: &str) -> Result<Playlist> {
        self.find_playlist(name).await
    }

    async fn fetch_bytes(&self, track: &Track) -> Result<Bytes> {
        self.download(track).await
    }

    async fn starred(&self) -> Result<HashSet<String>> {
        self.starred_ids().await
    }

    async fn set_starred(&self, track: &Track, starred: bool) -> Result<()> {
        self.star(track, starred).await
    }

    async fn report_now_playing(&self, track: &Track) -> Result<()> {
        self.scrobble(track, false).await
    }

    async fn report_completed(&self, track: &Track) -> Result<()> {
        self.scrobble(track, true).await
    }
}
