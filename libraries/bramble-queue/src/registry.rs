//! Tracking of live entries for teardown

use crate::entry::QueueEntry;
use crate::error::{QueueError, Result};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Registry {
    entries: Vec<Weak<QueueEntry>>,
    closed: bool,
}

/// Releases every entry a queue ever created
///
/// Cloneable and independent of the queue itself, so shutdown paths (signal
/// handlers, the input task) can clean up while a queue operation is still
/// running. Cleaning up is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CleanupHandle {
    inner: Arc<Mutex<Registry>>,
}

impl CleanupHandle {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Track a new entry. Fails with `Closed` (discarding the entry) after cleanup.
    pub(crate) fn register(&self, entry: &Arc<QueueEntry>) -> Result<()> {
        let mut registry = self.lock();
        if registry.closed {
            drop(registry);
            entry.discard();
            return Err(QueueError::Closed);
        }

        registry.entries.retain(|weak| weak.strong_count() > 0);
        registry.entries.push(Arc::downgrade(entry));
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Close the queue and discard every live entry.
    ///
    /// Returns the number of entries whose state changed.
    pub fn clean_up(&self) -> usize {
        let entries = {
            let mut registry = self.lock();
            if registry.closed && registry.entries.is_empty() {
                return 0;
            }
            registry.closed = true;
            std::mem::take(&mut registry.entries)
        };

        let released = entries
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|entry| entry.discard())
            .count();

        if released > 0 {
            info!(released, "Cleaned up queue entries");
        } else {
            debug!("Queue cleanup found nothing to release");
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryState;
    use bramble_catalog::Track;

    fn entry(id: &str) -> Arc<QueueEntry> {
        let track = Track {
            id: id.to_string(),
            title: id.to_string(),
            artist: String::new(),
            album: String::new(),
            path: String::new(),
            suffix: "mp3".to_string(),
            is_video: false,
            track_number: None,
            duration: None,
        };
        Arc::new(QueueEntry::new(track, false))
    }

    #[test]
    fn clean_up_discards_live_entries() {
        let handle = CleanupHandle::default();
        let a = entry("a");
        let b = entry("b");
        handle.register(&a).unwrap();
        handle.register(&b).unwrap();
        b.begin_fetch();

        assert_eq!(handle.clean_up(), 2);
        assert!(a.is_removed());
        assert_eq!(b.state(), EntryState::Fetching { discard: true });
        assert!(handle.is_closed());
    }

    #[test]
    fn clean_up_is_idempotent() {
        let handle = CleanupHandle::default();
        handle.register(&entry("a")).unwrap();

        let clone = handle.clone();
        handle.clean_up();
        assert_eq!(clone.clean_up(), 0);
    }

    #[test]
    fn register_after_clean_up_fails() {
        let handle = CleanupHandle::default();
        handle.clean_up();

        let late = entry("late");
        assert!(matches!(handle.register(&late), Err(QueueError::Closed)));
        assert!(late.is_removed());
    }

    #[test]
    fn dropped_entries_are_pruned() {
        let handle = CleanupHandle::default();
        for i in 0..10 {
            handle.register(&entry(&i.to_string())).unwrap();
        }
        let kept = entry("kept");
        handle.register(&kept).unwrap();

        assert_eq!(handle.lock().entries.len(), 1);
    }
}
