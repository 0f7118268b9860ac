//! Bramble - Prefetch Queue
//!
//! Turns a (possibly very large) remote playlist into a small rolling window
//! of local files, downloaded ahead of need.
//!
//! This crate provides:
//! - Bounded lookahead of background downloads (configurable depth)
//! - Bounded history with backward navigation
//! - Shuffle algorithms (Random + Smart), one permutation per pass
//! - Repeat modes (Off, All, Reload)
//! - Exactly-once deletion of downloaded files, including on shutdown
//! - Fire-and-forget scrobbling
//!
//! # Architecture
//!
//! The queue only knows the catalog through the [`bramble_catalog::Catalog`]
//! trait and never talks to the player: the application asks for the next
//! entry, plays its local file, and reports navigation back.
//!
//! # Example
//!
//! ```ignore
//! use bramble_queue::{PrefetchQueue, QueueConfig};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(SubsonicClient::new(config)?);
//! let mut queue = PrefetchQueue::open(catalog, "Road trip", QueueConfig::default(), dir.path()).await?;
//!
//! while let Some(entry) = queue.whats_next().await? {
//!     if let Some(path) = entry.local_file() {
//!         player.play(&path).await?;
//!     }
//! }
//!
//! queue.clean_up();
//! ```

pub mod entry;
pub mod error;
mod fetch;
pub mod history;
pub mod queue;
mod registry;
pub mod scrobble;
pub mod shuffle;
pub mod types;

pub use entry::{EntryState, QueueEntry};
pub use error::{FetchFailure, QueueError, Result};
pub use queue::PrefetchQueue;
pub use registry::CleanupHandle;
pub use scrobble::{Scrobbler, DEFAULT_THRESHOLD};
pub use types::{QueueConfig, RepeatMode, ShuffleMode};
