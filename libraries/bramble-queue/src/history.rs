//! Playback history tracking
//!
//! Maintains a bounded history of played entries for "previous" functionality

use crate::entry::QueueEntry;
use std::collections::VecDeque;
use std::sync::Arc;

/// Playback history with bounded size
///
/// Ring buffer of retired entries: pushing onto a full history evicts the
/// oldest entry and hands it back so the caller can release it.
#[derive(Debug)]
pub struct History {
    /// History buffer (most recent = back)
    entries: VecDeque<Arc<QueueEntry>>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
        }
    }

    /// Add entry to history, returning the evicted oldest entry if full
    pub fn push(&mut self, entry: Arc<QueueEntry>) -> Option<Arc<QueueEntry>> {
        if self.max_size == 0 {
            return Some(entry);
        }

        let evicted = if self.entries.len() >= self.max_size {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Most recent entry (without removing)
    pub fn peek(&self) -> Option<&Arc<QueueEntry>> {
        self.entries.back()
    }

    /// Pop most recent entry
    pub fn pop(&mut self) -> Option<Arc<QueueEntry>> {
        self.entries.pop_back()
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Arc<QueueEntry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Set maximum history size
    ///
    /// If the new size is smaller than the current length, the oldest entries
    /// are evicted and returned.
    pub fn set_max_size(&mut self, max_size: usize) -> Vec<Arc<QueueEntry>> {
        self.max_size = max_size;

        let excess = self.entries.len().saturating_sub(max_size);
        self.entries.drain(..excess).collect()
    }

    /// Remove and return everything, oldest first
    pub fn drain(&mut self) -> Vec<Arc<QueueEntry>> {
        self.entries.drain(..).collect()
    }
}
