//! mpv JSON IPC connection
//!
//! Commands are written as one JSON object per line carrying a
//! `request_id`. A reader task routes replies back to their callers by id
//! and fans asynchronous events out over a broadcast channel.

use crate::error::{MpvError, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 64;

/// An unsolicited message from mpv, such as `start-file` or `end-file`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    pub event: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub file_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    request_id: u64,
    error: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Incoming {
    Reply(Reply),
    Event(Event),
}

#[derive(Default)]
struct Pending {
    waiting: HashMap<u64, oneshot::Sender<Reply>>,
    closed: bool,
}

type SharedPending = Arc<Mutex<Pending>>;

fn lock(pending: &SharedPending) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// Client side of an mpv IPC socket
pub struct IpcClient {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: SharedPending,
    events: broadcast::Receiver<Event>,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
}

impl IpcClient {
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path)
            .await
            .map_err(|source| MpvError::Connect {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: UnixStream) -> Self {
        let (read, write) = stream.into_split();
        let pending = SharedPending::default();
        let (events_tx, events) = broadcast::channel(EVENT_CAPACITY);
        let reader = tokio::spawn(read_loop(read, pending.clone(), events_tx));

        Self {
            writer: tokio::sync::Mutex::new(write),
            pending,
            events,
            next_id: AtomicU64::new(1),
            reader,
        }
    }

    /// Receive events from this point on
    ///
    /// The receiver reports `Closed` once the connection is gone.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.resubscribe()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.pending).closed
    }

    /// Send a command and wait for its reply data
    pub async fn command(&self, args: &[Value]) -> Result<Value> {
        let name = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            if pending.closed {
                return Err(MpvError::Closed);
            }
            pending.waiting.insert(id, tx);
        }

        let mut line = serde_json::to_vec(&json!({ "command": args, "request_id": id }))?;
        line.push(b'\n');

        let written = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(&line).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            lock(&self.pending).waiting.remove(&id);
            return Err(e.into());
        }

        let reply = rx.await.map_err(|_| MpvError::Closed)?;
        if reply.error == "success" {
            Ok(reply.data)
        } else {
            tracing::debug!(command = %name, error = %reply.error, "mpv command failed");
            Err(MpvError::Command {
                command: name,
                error: reply.error,
            })
        }
    }

    pub async fn get_property(&self, name: &str) -> Result<Value> {
        self.command(&[json!("get_property"), json!(name)]).await
    }
}

impl Drop for IpcClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for IpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpcClient")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

async fn read_loop(read: OwnedReadHalf, pending: SharedPending, events: broadcast::Sender<Event>) {
    let mut lines = BufReader::new(read).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("mpv IPC read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Incoming>(&line) {
            Ok(Incoming::Reply(reply)) => {
                let waiter = lock(&pending).waiting.remove(&reply.request_id);
                if let Some(waiter) = waiter {
                    let _ = waiter.send(reply);
                }
            }
            Ok(Incoming::Event(event)) => {
                tracing::trace!(event = %event.event, "mpv event");
                // No subscribers is fine
                let _ = events.send(event);
            }
            Err(e) => tracing::debug!("Ignoring unrecognised mpv message: {} ({})", line, e),
        }
    }

    tracing::debug!("mpv IPC connection closed");
    let mut pending = lock(&pending);
    pending.closed = true;
    pending.waiting.clear();
}
