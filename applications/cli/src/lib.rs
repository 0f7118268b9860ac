//! Bramble terminal player
//!
//! Plays a Subsonic playlist through mpv with a small prefetch window of
//! downloaded tracks. The binary in `main.rs` wires these modules together;
//! they are exposed here for testing.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod session;

pub use cli::Cli;
pub use config::Settings;
pub use error::{AppError, Result};
pub use session::Outcome;
