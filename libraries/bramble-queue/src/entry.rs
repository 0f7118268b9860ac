//! Queue entries and their materialization lifecycle
//!
//! An entry moves through `Pending -> Fetching -> Ready -> Removed`. The state
//! lives in a `watch` channel, which is both the guard for every transition
//! and the completion signal awaited by whoever needs the file next.

use crate::error::FetchFailure;
use bramble_catalog::Track;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Materialization state of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// No local file (never fetched, or the last fetch failed)
    Pending,

    /// A download is in flight. With `discard` set the download deletes its
    /// own file on completion and the entry goes straight to `Removed`.
    Fetching { discard: bool },

    /// Downloaded and playable
    Ready(PathBuf),

    /// Released. Terminal for this entry instance.
    Removed,
}

impl EntryState {
    /// No download in flight
    pub fn is_settled(&self) -> bool {
        !matches!(self, EntryState::Fetching { .. })
    }
}

/// One track's place in the queue, shared with the application as a read handle
pub struct QueueEntry {
    track: Track,
    starred: AtomicBool,
    state: watch::Sender<EntryState>,
    failure: Mutex<Option<FetchFailure>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl QueueEntry {
    pub(crate) fn new(track: Track, starred: bool) -> Self {
        let (state, _) = watch::channel(EntryState::Pending);
        Self {
            track,
            starred: AtomicBool::new(starred),
            state,
            failure: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Starred flag as of the last catalog refresh
    pub fn is_starred(&self) -> bool {
        self.starred.load(Ordering::Relaxed)
    }

    pub(crate) fn set_starred(&self, starred: bool) {
        self.starred.store(starred, Ordering::Relaxed);
    }

    pub fn state(&self) -> EntryState {
        self.state.borrow().clone()
    }

    /// Path of the downloaded file, if the entry is `Ready`
    pub fn local_file(&self) -> Option<PathBuf> {
        match &*self.state.borrow() {
            EntryState::Ready(path) => Some(path.clone()),
            _ => None,
        }
    }

    pub fn is_downloading(&self) -> bool {
        !self.state.borrow().is_settled()
    }

    pub fn is_removed(&self) -> bool {
        *self.state.borrow() == EntryState::Removed
    }

    /// Wait until no download is in flight and return the state reached.
    pub async fn settled(&self) -> EntryState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(EntryState::is_settled).await {
            Ok(state) => state.clone(),
            // Unreachable while `self` owns the sender
            Err(_) => self.state(),
        };
        settled
    }

    /// Take the failure stored by the last fetch. Each failure is returned once.
    pub(crate) fn take_failure(&self) -> Option<FetchFailure> {
        lock(&self.failure).take()
    }

    /// `Pending -> Fetching`. Returns false if the entry is in any other state.
    pub(crate) fn begin_fetch(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == EntryState::Pending {
                *state = EntryState::Fetching { discard: false };
                true
            } else {
                false
            }
        })
    }

    /// Record the outcome of the fetch started by `begin_fetch`.
    pub(crate) fn complete(&self, result: Result<PathBuf, FetchFailure>) {
        self.state.send_if_modified(|state| {
            let EntryState::Fetching { discard } = *state else {
                // No fetch of ours is in flight, so nobody owns this file
                if let Ok(path) = result {
                    remove_local_file(&path);
                }
                return false;
            };

            *state = match (discard, result) {
                (false, Ok(path)) => EntryState::Ready(path),
                (false, Err(failure)) => {
                    *lock(&self.failure) = Some(failure);
                    EntryState::Pending
                }
                (true, Ok(path)) => {
                    remove_local_file(&path);
                    EntryState::Removed
                }
                (true, Err(_)) => EntryState::Removed,
            };
            true
        });
    }

    pub(crate) fn attach_task(&self, handle: JoinHandle<()>) {
        *lock(&self.task) = Some(handle);
    }

    /// Join the background download task, if any. Only the first caller joins.
    pub(crate) async fn join_fetch(&self) {
        let handle = lock(&self.task).take();
        let Some(handle) = handle else {
            return;
        };

        if let Err(e) = handle.await {
            warn!(track_id = %self.track.id, error = %e, "Download task did not finish");
            self.complete(Err(FetchFailure::Aborted(e.to_string())));
        }
    }

    /// Release the entry, waiting for an in-flight download to finish first.
    ///
    /// Returns true if this call performed the removal; removing an entry that
    /// is already `Removed` is a no-op and never deletes twice.
    pub async fn remove(&self) -> bool {
        loop {
            self.settled().await;

            let mut outcome = None;
            self.state.send_if_modified(|state| match state {
                // Another fetch started after we woke up
                EntryState::Fetching { .. } => false,
                EntryState::Removed => {
                    outcome = Some(false);
                    false
                }
                EntryState::Pending => {
                    *state = EntryState::Removed;
                    outcome = Some(true);
                    true
                }
                EntryState::Ready(path) => {
                    let path = std::mem::take(path);
                    *state = EntryState::Removed;
                    remove_local_file(&path);
                    outcome = Some(true);
                    true
                }
            });

            if let Some(removed) = outcome {
                return removed;
            }
        }
    }

    /// Release the entry without waiting.
    ///
    /// A `Fetching` entry is only marked; its download deletes the file when
    /// it completes. Returns true if the state changed.
    pub fn discard(&self) -> bool {
        self.state.send_if_modified(|state| match state {
            EntryState::Ready(path) => {
                let path = std::mem::take(path);
                *state = EntryState::Removed;
                remove_local_file(&path);
                true
            }
            EntryState::Pending => {
                *state = EntryState::Removed;
                true
            }
            EntryState::Fetching { discard } => {
                let changed = !*discard;
                *discard = true;
                changed
            }
            EntryState::Removed => false,
        })
    }
}

impl fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEntry")
            .field("track_id", &self.track.id)
            .field("title", &self.track.title)
            .field("starred", &self.is_starred())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

fn remove_local_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Released local file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Local file already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete local file"),
    }
}
