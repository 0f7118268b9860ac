//! Bramble mpv driver
//!
//! Starts mpv in idle mode and drives it over its JSON IPC socket:
//! - [`MpvProcess`] owns the child process
//! - [`IpcClient`] speaks the line-delimited protocol
//! - [`Mpv`] offers playback commands and per-file progress streams

pub mod error;
pub mod ipc;
pub mod player;
pub mod process;

pub use error::{MpvError, Result};
pub use ipc::{Event, IpcClient};
pub use player::{Mpv, PlayProgress};
pub use process::MpvProcess;
