//! Shared fixtures: an in-memory catalog with failure injection and
//! per-track download gates.

#![allow(dead_code)]

use async_trait::async_trait;
use bramble_catalog::{Catalog, CatalogError, Playlist, Result, Track};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Title {}", id),
        artist: format!("Artist {}", id),
        album: "Album".to_string(),
        path: format!("Artist/Album/{}.mp3", id),
        suffix: "mp3".to_string(),
        is_video: false,
        track_number: None,
        duration: Some(200),
    }
}

pub fn playlist(name: &str, ids: &[&str]) -> Playlist {
    Playlist {
        id: format!("pl-{}", name),
        name: name.to_string(),
        song_count: ids.len() as u32,
        duration: 200 * ids.len() as u32,
        tracks: ids.iter().map(|id| track(id)).collect(),
    }
}

/// Number of files in the download directory
pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Holds a track's download until opened
pub struct Gate(watch::Sender<bool>);

impl Gate {
    pub fn open(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    playlists: Mutex<HashMap<String, Playlist>>,
    starred: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, watch::Receiver<bool>>>,
    fetched: Mutex<Vec<String>>,
    reports: Mutex<Vec<(String, bool)>>,
    starred_unavailable: AtomicBool,
    resolve_fails: AtomicBool,
}

impl FakeCatalog {
    pub fn with_playlist(playlist: Playlist) -> Arc<Self> {
        let catalog = Self::default();
        catalog.set_playlist(playlist);
        Arc::new(catalog)
    }

    pub fn set_playlist(&self, playlist: Playlist) {
        self.playlists
            .lock()
            .unwrap()
            .insert(playlist.name.clone(), playlist);
    }

    /// Make downloads of `id` fail until healed
    pub fn fail_fetch(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn heal_fetch(&self, id: &str) {
        self.failing.lock().unwrap().remove(id);
    }

    /// Block downloads of `id` until the returned gate is opened
    pub fn gate(&self, id: &str) -> Gate {
        let (tx, rx) = watch::channel(false);
        self.gates.lock().unwrap().insert(id.to_string(), rx);
        Gate(tx)
    }

    pub fn set_starred_unavailable(&self, unavailable: bool) {
        self.starred_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_resolve_fails(&self, fails: bool) {
        self.resolve_fails.store(fails, Ordering::SeqCst);
    }

    /// Ids in the order their downloads were requested
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn starred_ids(&self) -> HashSet<String> {
        self.starred.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<(String, bool)> {
        self.reports.lock().unwrap().clone()
    }
}

fn unavailable() -> CatalogError {
    CatalogError::ServerError {
        status: 503,
        message: "unavailable".to_string(),
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn resolve_playlist(&self, name: &str) -> Result<Playlist> {
        if self.resolve_fails.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.playlists
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::PlaylistNotFound(name.to_string()))
    }

    async fn fetch_bytes(&self, track: &Track) -> Result<Bytes> {
        self.fetched.lock().unwrap().push(track.id.clone());

        let gate = self.gates.lock().unwrap().get(&track.id).cloned();
        if let Some(mut gate) = gate {
            let _ = gate.wait_for(|open| *open).await;
        }

        if self.failing.lock().unwrap().contains(&track.id) {
            return Err(unavailable());
        }
        Ok(Bytes::from(format!("audio:{}", track.id)))
    }

    async fn starred(&self) -> Result<HashSet<String>> {
        if self.starred_unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.starred_ids())
    }

    async fn set_starred(&self, track: &Track, starred: bool) -> Result<()> {
        let mut set = self.starred.lock().unwrap();
        if starred {
            set.insert(track.id.clone());
        } else {
            set.remove(&track.id);
        }
        Ok(())
    }

    async fn report_now_playing(&self, track: &Track) -> Result<()> {
        self.reports.lock().unwrap().push((track.id.clone(), false));
        Ok(())
    }

    async fn report_completed(&self, track: &Track) -> Result<()> {
        self.reports.lock().unwrap().push((track.id.clone(), true));
        Ok(())
    }
}
