//! Owning the mpv child process

use crate::error::{MpvError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// A running mpv instance listening on a JSON IPC socket
///
/// mpv is started idle with its terminal UI disabled. The child is killed
/// when this value is dropped.
#[derive(Debug)]
pub struct MpvProcess {
    child: Child,
    socket: PathBuf,
}

impl MpvProcess {
    pub fn spawn(binary: impl AsRef<OsStr>, socket: impl Into<PathBuf>) -> Result<Self> {
        let socket = socket.into();
        let binary = binary.as_ref();

        tracing::debug!(binary = ?binary, socket = %socket.display(), "Starting mpv");

        let child = Command::new(binary)
            .args(launch_args(&socket))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(MpvError::Spawn)?;

        Ok(Self { child, socket })
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Resolves when mpv exits
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }

    /// Kill mpv if it is still running and reap it
    pub async fn kill(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }
        Ok(())
    }
}

fn launch_args(socket: &Path) -> Vec<String> {
    vec![
        "--idle=yes".to_string(),
        "--no-terminal".to_string(),
        format!("--input-ipc-server={}", socket.display()),
    ]
}
