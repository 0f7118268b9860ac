//! Play reporting

use bramble_catalog::{Catalog, Track};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default share of a track that must be heard before it counts as played
pub const DEFAULT_THRESHOLD: u8 = 75;

/// Fire-and-forget play reports to the catalog
///
/// Failures are logged at debug level and otherwise ignored. The returned
/// handles may be dropped; they exist so callers can wait in tests.
#[derive(Clone)]
pub struct Scrobbler {
    catalog: Arc<dyn Catalog>,
    threshold: f64,
}

impl Scrobbler {
    /// `threshold` is a percentage, clamped to 0..=100.
    pub fn new(catalog: Arc<dyn Catalog>, threshold: u8) -> Self {
        Self {
            catalog,
            threshold: f64::from(threshold.min(100)),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a track heard up to `percent` counts as played.
    pub fn should_submit(&self, percent: f64) -> bool {
        percent >= self.threshold
    }

    /// Report that `track` started playing.
    pub fn now_playing(&self, track: &Track) -> JoinHandle<()> {
        let catalog = Arc::clone(&self.catalog);
        let track = track.clone();
        tokio::spawn(async move {
            if let Err(e) = catalog.report_now_playing(&track).await {
                debug!(track_id = %track.id, error = %e, "Now-playing report failed");
            }
        })
    }

    /// Report a finished track if it was heard past the threshold.
    pub fn finished(&self, track: &Track, percent: f64) -> Option<JoinHandle<()>> {
        if !self.should_submit(percent) {
            debug!(track_id = %track.id, percent, "Not scrobbling: below threshold");
            return None;
        }

        let catalog = Arc::clone(&self.catalog);
        let track = track.clone();
        Some(tokio::spawn(async move {
            match catalog.report_completed(&track).await {
                Ok(()) => debug!(track_id = %track.id, "Scrobbled"),
                Err(e) => debug!(track_id = %track.id, error = %e, "Scrobble failed"),
            }
        }))
    }
}

impl std::fmt::Debug for Scrobbler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scrobbler")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
