//! Bramble Catalog
//!
//! Client for Subsonic-compatible media servers (Subsonic, Navidrome, Gonic,
//! Airsonic) speaking REST API 1.16.1 with JSON responses.
//!
//! # Features
//!
//! - **Authentication**: salted md5 token per request, or legacy hex password
//! - **Playlists**: list, fetch, resolve by name
//! - **Download**: raw bytes of the original track file
//! - **Annotation**: star/unstar, scrobble "now playing" and "played"
//!
//! The [`Catalog`] trait is the narrow seam the queue engine depends on.
//!
//! # Example
//!
//! ```ignore
//! use bramble_catalog::{Catalog, CatalogConfig, SubsonicClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CatalogConfig::new("https://music.example.com", "me", "secret");
//!     let client = SubsonicClient::new(config)?;
//!
//!     client.ping().await?;
//!     let playlist = client.resolve_playlist("Road trip").await?;
//!     for track in &playlist.tracks {
//!         println!("{} - {}", track.artist, track.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod catalog;
mod client;
mod download;
mod error;
mod library;
mod types;

pub use catalog::Catalog;
pub use client::SubsonicClient;
pub use error::{CatalogError, Result};
pub use types::{AuthMode, CatalogConfig, Playlist, PlaylistSummary, Track, API_VERSION};
