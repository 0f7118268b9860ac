//! High-level playback control over IPC

use crate::error::{MpvError, Result};
use crate::ipc::{Event, IpcClient};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Playback position report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayProgress {
    /// Position in the current file, 0 to 100
    pub percent: f64,
}

/// Handle to a connected mpv instance
#[derive(Debug, Clone)]
pub struct Mpv {
    ipc: Arc<IpcClient>,
    poll_interval: Duration,
}

impl Mpv {
    /// Connect to the socket, waiting for mpv to create it
    pub async fn connect(socket: impl AsRef<Path>) -> Result<Self> {
        let socket = socket.as_ref();
        let mut attempt = 1;
        loop {
            match IpcClient::connect(socket).await {
                Ok(ipc) => {
                    tracing::debug!(attempt, "Connected to mpv");
                    return Ok(Self::from_client(ipc));
                }
                Err(e) if attempt >= CONNECT_ATTEMPTS => return Err(e),
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
            }
        }
    }

    pub fn from_client(ipc: IpcClient) -> Self {
        Self {
            ipc: Arc::new(ipc),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.ipc.is_closed()
    }

    /// Replace whatever is playing with `path`
    ///
    /// Returns a stream of position reports. The stream ends when the file
    /// finishes or is stopped, when the position can no longer be read, or
    /// when the connection drops.
    pub async fn play(&self, path: &Path) -> Result<mpsc::Receiver<PlayProgress>> {
        let events = self.ipc.subscribe();
        self.ipc
            .command(&[
                json!("loadfile"),
                json!(path.to_string_lossy()),
                json!("replace"),
            ])
            .await?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(track_progress(
            self.ipc.clone(),
            events,
            tx,
            self.poll_interval,
        ));
        Ok(rx)
    }

    pub async fn toggle_pause(&self) -> Result<()> {
        self.ipc.command(&[json!("cycle"), json!("pause")]).await?;
        Ok(())
    }

    pub async fn toggle_mute(&self) -> Result<()> {
        self.ipc.command(&[json!("cycle"), json!("mute")]).await?;
        Ok(())
    }

    /// Stop the current file; its progress stream ends
    pub async fn stop(&self) -> Result<()> {
        self.ipc.command(&[json!("stop")]).await?;
        Ok(())
    }

    /// Ask mpv to exit
    pub async fn quit(&self) -> Result<()> {
        match self.ipc.command(&[json!("quit")]).await {
            Ok(_) | Err(MpvError::Closed) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Wait until our file has loaded
///
/// An `end-file` for the replaced file can arrive before our `start-file`.
/// One that arrives after it means the load failed.
async fn wait_loaded(events: &mut broadcast::Receiver<Event>) -> bool {
    let mut started = false;
    loop {
        match events.recv().await {
            Ok(event) => match event.event.as_str() {
                "start-file" => started = true,
                "file-loaded" if started => return true,
                "end-file" if started => {
                    tracing::debug!(error = ?event.file_error, "File failed to load");
                    return false;
                }
                _ => {}
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!("Missed {} mpv events", n);
            }
            Err(broadcast::error::RecvError::Closed) => return false,
        }
    }
}

async fn track_progress(
    ipc: Arc<IpcClient>,
    mut events: broadcast::Receiver<Event>,
    tx: mpsc::Sender<PlayProgress>,
    poll_interval: Duration,
) {
    if !wait_loaded(&mut events).await {
        return;
    }

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            received = events.recv() => match received {
                Ok(event) if event.event == "end-file" => {
                    tracing::debug!(reason = ?event.reason, "File ended");
                    break;
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                let percent = match ipc.get_property("percent-pos").await {
                    Ok(value) => value.as_f64(),
                    Err(e) => {
                        tracing::debug!("Position unavailable: {}", e);
                        break;
                    }
                };
                if let Some(percent) = percent {
                    if tx.send(PlayProgress { percent }).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}
