//! Downloads entries into the session directory

use crate::entry::QueueEntry;
use crate::error::FetchFailure;
use bramble_catalog::{Catalog, Track};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Clone)]
pub(crate) struct Fetcher {
    catalog: Arc<dyn Catalog>,
    dir: PathBuf,
}

impl Fetcher {
    pub(crate) fn new(catalog: Arc<dyn Catalog>, dir: PathBuf) -> Self {
        Self { catalog, dir }
    }

    /// Download in the caller's task. No-op unless the entry is `Pending`.
    pub(crate) async fn fetch(&self, entry: &QueueEntry) {
        if entry.begin_fetch() {
            self.run(entry).await;
        }
    }

    /// Download in a background task owned by the entry.
    pub(crate) fn spawn(&self, entry: &Arc<QueueEntry>) {
        if !entry.begin_fetch() {
            return;
        }

        let fetcher = self.clone();
        let task_entry = Arc::clone(entry);
        let handle = tokio::spawn(async move { fetcher.run(&task_entry).await });
        entry.attach_task(handle);
    }

    async fn run(&self, entry: &QueueEntry) {
        let track = entry.track();
        debug!(track_id = %track.id, title = %track.title, "Fetching track");

        let result = self.download(track).await;
        match &result {
            Ok(path) => debug!(track_id = %track.id, path = %path.display(), "Fetched track"),
            Err(e) => warn!(track_id = %track.id, error = %e, "Fetch failed"),
        }
        entry.complete(result);
    }

    async fn download(&self, track: &Track) -> Result<PathBuf, FetchFailure> {
        let bytes = self
            .catalog
            .fetch_bytes(track)
            .await
            .map_err(FetchFailure::Transfer)?;

        let path = self.dir.join(local_file_name(track));
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(FetchFailure::Write)?;

        let written: std::io::Result<()> = async {
            file.write_all(&bytes).await?;
            file.flush().await
        }
        .await;
        drop(file);

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %cleanup, "Failed to delete partial file");
            }
            return Err(FetchFailure::Write(e));
        }

        Ok(path)
    }
}

/// Collision-free name for the local copy of a track.
pub(crate) fn local_file_name(track: &Track) -> String {
    let suffix: String = track
        .suffix
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if suffix.is_empty() {
        format!("bramble-{}", uuid::Uuid::new_v4())
    } else {
        format!("bramble-{}.{}", uuid::Uuid::new_v4(), suffix)
    }
}
