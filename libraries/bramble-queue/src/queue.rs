//! Prefetching playback queue
//!
//! Turns a playlist into a rolling window of locally downloaded files:
//! - **Playing**: the one entry handed to the player
//! - **Lookahead**: up to `depth` entries downloading or downloaded in the background
//! - **History**: retired entries, re-fetched on demand for "previous"
//!
//! Tracks not yet turned into entries wait in the working list, one pass of
//! the playlist (shuffled or in catalog order) at a time.

use crate::entry::{EntryState, QueueEntry};
use crate::error::{QueueError, Result};
use crate::fetch::Fetcher;
use crate::history::History;
use crate::registry::CleanupHandle;
use crate::shuffle::shuffle_tracks;
use crate::types::{QueueConfig, RepeatMode};
use bramble_catalog::{Catalog, Playlist, Track};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One playback session over a playlist
pub struct PrefetchQueue {
    catalog: Arc<dyn Catalog>,
    fetcher: Fetcher,
    registry: CleanupHandle,
    config: QueueConfig,

    /// Name the playlist is re-resolved by on reload
    playlist_name: String,

    /// Every track of the playlist, catalog order
    master: Vec<Track>,

    /// Rest of the current pass
    remaining: VecDeque<Track>,

    lookahead: VecDeque<Arc<QueueEntry>>,
    history: History,
    playing: Option<Arc<QueueEntry>>,

    /// Starred track ids as of the last refresh
    starred: HashSet<String>,
}

impl PrefetchQueue {
    /// Resolve `playlist` by name and create a queue for it.
    ///
    /// Fails with `NotPlayable` if the playlist is empty.
    pub async fn open(
        catalog: Arc<dyn Catalog>,
        playlist: &str,
        config: QueueConfig,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;

        let resolved = catalog.resolve_playlist(playlist).await?;
        if resolved.tracks.is_empty() {
            return Err(QueueError::NotPlayable(playlist.to_string()));
        }

        info!(
            playlist = %resolved.name,
            tracks = resolved.tracks.len(),
            depth = config.depth,
            shuffle = ?config.shuffle,
            repeat = ?config.repeat,
            "Opened playlist"
        );
        Self::new(catalog, resolved, config, download_dir)
    }

    /// Create a queue over an already resolved playlist.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        playlist: Playlist,
        config: QueueConfig,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            fetcher: Fetcher::new(Arc::clone(&catalog), download_dir.into()),
            catalog,
            registry: CleanupHandle::default(),
            playlist_name: playlist.name,
            history: History::new(playlist.tracks.len()),
            master: playlist.tracks,
            remaining: VecDeque::new(),
            lookahead: VecDeque::new(),
            playing: None,
            starred: HashSet::new(),
            config,
        })
    }

    /// Handle for releasing every entry from another task.
    pub fn cleanup_handle(&self) -> CleanupHandle {
        self.registry.clone()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn playlist_name(&self) -> &str {
        &self.playlist_name
    }

    /// Number of tracks in the playlist as last resolved
    pub fn playlist_len(&self) -> usize {
        self.master.len()
    }

    /// The entry currently handed to the player
    pub fn playing(&self) -> Option<Arc<QueueEntry>> {
        self.playing.clone()
    }

    /// Entries queued after the playing one, in play order
    pub fn upcoming(&self) -> Vec<Arc<QueueEntry>> {
        self.lookahead.iter().cloned().collect()
    }

    pub fn lookahead_len(&self) -> usize {
        self.lookahead.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Tracks of the current pass not yet turned into entries
    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }

    /// Advance to the next entry and wait until its file is downloaded.
    ///
    /// Returns `None` once the playlist is exhausted and repeat is off, or
    /// for an empty playlist.
    pub async fn whats_next(&mut self) -> Result<Option<Arc<QueueEntry>>> {
        self.ensure_open()?;

        if self.remaining.is_empty() && self.lookahead.is_empty() {
            let started = self.playing.is_some() || !self.history.is_empty();
            if started {
                match self.config.repeat {
                    RepeatMode::Off => {
                        debug!("Playlist exhausted");
                        self.retire_playing().await;
                        return Ok(None);
                    }
                    RepeatMode::All => {}
                    RepeatMode::Reload => self.reload().await?,
                }
            }

            if self.master.is_empty() {
                self.retire_playing().await;
                return Ok(None);
            }
            self.start_pass();
        }

        self.refresh_starred().await;

        let next = self.lookahead.pop_front();
        self.retire_playing().await;
        self.playing = next;

        self.fill_lookahead().await?;

        self.ready_playing().await
    }

    /// Fetch the playing entry again after a surfaced fetch failure.
    pub async fn retry(&mut self) -> Result<Option<Arc<QueueEntry>>> {
        self.ensure_open()?;
        self.ready_playing().await
    }

    /// Step back to the most recently played entry.
    ///
    /// The restored entry and then the one playing now are put at the front of
    /// the lookahead; the next two `whats_next` calls return them in that
    /// order. Returns false if there is nothing to go back to.
    pub async fn previous(&mut self) -> Result<bool> {
        self.ensure_open()?;

        if self.master.is_empty() {
            return Ok(false);
        }
        let Some(last) = self.history.pop() else {
            return Ok(false);
        };

        let restored = match self.restore(&last).await {
            Ok(entry) => entry,
            Err(e) => {
                self.push_history(last);
                return Err(e);
            }
        };
        // Released while the download ran
        if self.registry.is_closed() {
            restored.discard();
            return Err(QueueError::Closed);
        }
        debug!(track_id = %restored.track().id, "Stepping back");

        if let Some(current) = self.playing.take() {
            current.settled().await;
            self.lookahead.push_front(current);
        }
        self.lookahead.push_front(restored);

        while self.lookahead.len() > self.config.depth {
            if let Some(entry) = self.lookahead.pop_back() {
                entry.discard();
                self.remaining.push_front(entry.track().clone());
            }
        }

        Ok(true)
    }

    /// Flip the starred flag of the playing entry.
    ///
    /// Returns the flag as reported by the catalog afterwards, or `None` if
    /// nothing is playing. A failed update is logged and otherwise ignored.
    pub async fn star_toggle(&mut self) -> Result<Option<bool>> {
        self.ensure_open()?;

        let Some(entry) = self.playing.clone() else {
            return Ok(None);
        };
        let track = entry.track();

        self.refresh_starred().await;
        let target = !self.starred.contains(&track.id);

        if let Err(e) = self.catalog.set_starred(track, target).await {
            warn!(track_id = %track.id, starred = target, error = %e, "Failed to update starred flag");
        }

        self.refresh_starred().await;
        let starred = self.starred.contains(&track.id);
        entry.set_starred(starred);

        info!(track_id = %track.id, starred, "Toggled starred flag");
        Ok(Some(starred))
    }

    /// Release every entry and close the queue.
    ///
    /// Later operations fail with `QueueError::Closed`.
    pub fn clean_up(&mut self) -> usize {
        let released = self.registry.clean_up();
        self.playing = None;
        self.lookahead.clear();
        self.history.drain();
        self.remaining.clear();
        released
    }

    fn ensure_open(&self) -> Result<()> {
        if self.registry.is_closed() {
            Err(QueueError::Closed)
        } else {
            Ok(())
        }
    }

    fn new_entry(&self, track: Track) -> Result<Arc<QueueEntry>> {
        let starred = self.starred.contains(&track.id);
        let entry = Arc::new(QueueEntry::new(track, starred));
        self.registry.register(&entry)?;
        Ok(entry)
    }

    /// Re-resolve the playlist. Leaves the queue untouched on failure.
    async fn reload(&mut self) -> Result<()> {
        let playlist = self.catalog.resolve_playlist(&self.playlist_name).await?;
        info!(
            playlist = %playlist.name,
            tracks = playlist.tracks.len(),
            "Reloaded playlist"
        );

        self.master = playlist.tracks;
        for evicted in self.history.set_max_size(self.master.len()) {
            evicted.discard();
        }
        Ok(())
    }

    fn start_pass(&mut self) {
        let mut pass = self.master.clone();
        shuffle_tracks(&mut pass, self.config.shuffle);
        debug!(tracks = pass.len(), shuffle = ?self.config.shuffle, "Starting pass");
        self.remaining = pass.into();
    }

    /// Refresh the starred snapshot; on failure keep the old one.
    async fn refresh_starred(&mut self) {
        match self.catalog.starred().await {
            Ok(starred) => self.starred = starred,
            Err(e) => {
                warn!(error = %e, "Failed to refresh starred tracks");
                return;
            }
        }

        for entry in self.playing.iter().chain(self.lookahead.iter()) {
            entry.set_starred(self.starred.contains(&entry.track().id));
        }
    }

    /// Move the playing entry to history and release its file.
    async fn retire_playing(&mut self) {
        if let Some(entry) = self.playing.take() {
            entry.remove().await;
            self.push_history(entry);
        }
    }

    fn push_history(&mut self, entry: Arc<QueueEntry>) {
        if let Some(evicted) = self.history.push(entry) {
            evicted.discard();
        }
    }

    /// Top the lookahead up to `depth`, starting downloads.
    async fn fill_lookahead(&mut self) -> Result<()> {
        while self.lookahead.len() < self.config.depth {
            let Some(track) = self.remaining.pop_front() else {
                break;
            };
            let entry = self.new_entry(track)?;

            if self.playing.is_none() {
                // Nothing to play yet: download this one before anything else
                self.playing = Some(Arc::clone(&entry));
                self.fetcher.fetch(&entry).await;
            } else {
                self.fetcher.spawn(&entry);
                self.lookahead.push_back(entry);
            }
        }
        Ok(())
    }

    /// Make sure the playing entry has its file, fetching it if needed.
    async fn ready_playing(&mut self) -> Result<Option<Arc<QueueEntry>>> {
        let Some(mut entry) = self.playing.clone() else {
            return Ok(None);
        };

        loop {
            self.ensure_open()?;

            entry.join_fetch().await;
            let state = entry.settled().await;
            if let Some(failure) = entry.take_failure() {
                return Err(QueueError::fetch(entry.track(), failure));
            }

            match state {
                EntryState::Ready(_) => return Ok(Some(entry)),
                EntryState::Pending => self.fetcher.fetch(&entry).await,
                EntryState::Removed => {
                    // Released behind our back; removal is terminal, so start over
                    entry = self.new_entry(entry.track().clone())?;
                    self.playing = Some(Arc::clone(&entry));
                }
                EntryState::Fetching { .. } => {}
            }
        }
    }

    /// Entry to put back in front of the lookahead for `last`.
    async fn restore(&self, last: &Arc<QueueEntry>) -> Result<Arc<QueueEntry>> {
        if let EntryState::Ready(_) = last.settled().await {
            return Ok(Arc::clone(last));
        }

        let entry = self.new_entry(last.track().clone())?;
        self.fetcher.fetch(&entry).await;
        if let Some(failure) = entry.take_failure() {
            entry.discard();
            return Err(QueueError::fetch(entry.track(), failure));
        }
        Ok(entry)
    }
}

impl Drop for PrefetchQueue {
    fn drop(&mut self) {
        self.registry.clean_up();
    }
}

impl std::fmt::Debug for PrefetchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchQueue")
            .field("playlist", &self.playlist_name)
            .field("tracks", &self.master.len())
            .field("remaining", &self.remaining.len())
            .field("lookahead", &self.lookahead.len())
            .field("history", &self.history.len())
            .field("playing", &self.playing)
            .field("closed", &self.registry.is_closed())
            .finish()
    }
}
