//! Playback session
//!
//! Resolves the playlist, starts mpv in a private temporary directory and
//! plays the queue until it runs out, the user quits, a signal arrives or
//! mpv goes away. Queue entries are released and mpv is stopped on every
//! one of those paths.

use crate::config::Settings;
use crate::display::Display;
use crate::error::{AppError, Result};
use crate::input::{self, Command, RawMode};
use bramble_catalog::{Catalog, SubsonicClient};
use bramble_mpv::{Mpv, MpvError, MpvProcess};
use bramble_queue::{PrefetchQueue, Scrobbler};
use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, Mutex};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The playlist ran out
    Finished,
    /// The user asked to quit
    Quit,
    /// Terminated by the named signal
    Interrupted(&'static str),
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Finished | Outcome::Quit => 0,
            Outcome::Interrupted(_) => 130,
        }
    }
}

/// Print the server's playlists
pub async fn list_playlists(settings: &Settings) -> Result<()> {
    let client = SubsonicClient::new(settings.catalog_config())?;
    for playlist in client.playlists().await? {
        println!("{:>6}  {}", playlist.song_count, playlist.name);
    }
    Ok(())
}

/// Play the configured playlist
pub async fn run(settings: &Settings) -> Result<Outcome> {
    let catalog: Arc<dyn Catalog> = Arc::new(SubsonicClient::new(settings.catalog_config())?);
    let workdir = tempfile::Builder::new().prefix("bramble-").tempdir()?;

    let queue = PrefetchQueue::open(
        Arc::clone(&catalog),
        &settings.playback.playlist,
        settings.queue_config(),
        workdir.path(),
    )
    .await?;
    let cleanup = queue.cleanup_handle();

    let socket = workdir.path().join("mpv.sock");
    let mut process = MpvProcess::spawn(&settings.playback.mpv, &socket)?;

    let scrobbler = Scrobbler::new(catalog, settings.playback.scrobble_threshold);
    let outcome = drive(queue, scrobbler, &mut process, &socket).await;

    let released = cleanup.clean_up();
    tracing::debug!(released, "Released queue entries");
    if let Err(e) = process.kill().await {
        tracing::warn!("Failed to stop mpv: {}", e);
    }

    tracing::info!(outcome = ?outcome, "Session ended");
    outcome
}

async fn drive(
    queue: PrefetchQueue,
    scrobbler: Scrobbler,
    process: &mut MpvProcess,
    socket: &Path,
) -> Result<Outcome> {
    let mpv = tokio::select! {
        mpv = Mpv::connect(socket) => mpv?,
        status = process.wait() => return Err(AppError::PlayerExited(status?)),
    };

    let player = Player {
        queue: Mutex::new(queue),
        mpv,
        scrobbler,
        display: Display::new(),
    };

    let raw_mode = match RawMode::enable() {
        Ok(guard) => Some(guard),
        Err(e) => {
            tracing::warn!("Keyboard controls unavailable: {}", e);
            None
        }
    };
    let (tx, rx) = mpsc::channel(16);
    let reader = input::spawn_reader(tx);

    let outcome = tokio::select! {
        result = player.play_all() => result.map(|()| Outcome::Finished),
        result = player.control(rx) => result,
        name = shutdown_signal() => Ok(Outcome::Interrupted(name?)),
        status = process.wait() => Err(AppError::PlayerExited(status?)),
    };

    player.display.clear();
    if let Err(e) = player.mpv.quit().await {
        tracing::debug!("mpv quit failed: {}", e);
    }
    drop(raw_mode);
    // The reader notices the closed channel on its next poll
    if let Err(e) = reader.await {
        tracing::debug!("Input reader ended abnormally: {}", e);
    }
    outcome
}

struct Player {
    queue: Mutex<PrefetchQueue>,
    mpv: Mpv,
    scrobbler: Scrobbler,
    display: Display,
}

impl Player {
    async fn play_all(&self) -> Result<()> {
        loop {
            // Hold the queue until mpv has the file so a concurrent
            // `previous` cannot land between the two
            let (entry, mut progress) = {
                let mut queue = self.queue.lock().await;
                let Some(entry) = queue.whats_next().await? else {
                    return Ok(());
                };
                let Some(path) = entry.local_file() else {
                    tracing::warn!(track = %entry.track().id, "Entry has no local file");
                    continue;
                };
                let progress = self.mpv.play(&path).await?;
                (entry, progress)
            };

            let track = entry.track();
            tracing::info!(track = %track.id, title = %track.title, "Playing");
            self.display.start(track, entry.is_starred());
            // Scrobble tasks are fire-and-forget
            drop(self.scrobbler.now_playing(track));

            let mut last = 0.0;
            while let Some(sample) = progress.recv().await {
                last = sample.percent;
                self.display.set_percent(last);
            }

            self.display.finish(track);
            drop(self.scrobbler.finished(track, last));
        }
    }

    async fn control(&self, mut commands: mpsc::Receiver<Command>) -> Result<Outcome> {
        dispatch(&mut commands, move |command| self.handle(command)).await
    }

    async fn handle(&self, command: Command) -> Result<()> {
        tracing::debug!(?command, "Key command");
        match command {
            Command::Quit => {}
            Command::TogglePause => tolerate(self.mpv.toggle_pause().await)?,
            Command::ToggleMute => tolerate(self.mpv.toggle_mute().await)?,
            Command::Next => tolerate(self.mpv.stop().await)?,
            Command::Previous => {
                let moved = self.queue.lock().await.previous().await?;
                if moved {
                    tolerate(self.mpv.stop().await)?;
                } else {
                    self.display.notice("Nothing to go back to");
                }
            }
            Command::ToggleStar => {
                let mut queue = self.queue.lock().await;
                match queue.star_toggle().await {
                    Ok(Some(starred)) => {
                        if let Some(entry) = queue.playing() {
                            self.display.set_starred(entry.track(), starred);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("Star toggle failed: {}", e);
                        self.display.notice(&format!("Could not update star: {}", e));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Run key commands in arrival order until the user quits.
///
/// Keys keep being read while a command runs, so a quit key ends the
/// session even when a queue operation is stuck on a slow download. Other
/// keys pressed meanwhile wait their turn.
async fn dispatch<F, Fut>(commands: &mut mpsc::Receiver<Command>, mut handle: F) -> Result<Outcome>
where
    F: FnMut(Command) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut backlog = VecDeque::new();
    loop {
        let command = match backlog.pop_front() {
            Some(command) => command,
            None => match commands.recv().await {
                Some(command) => command,
                // No keyboard; play until something else ends the session
                None => return std::future::pending().await,
            },
        };
        if command == Command::Quit {
            return Ok(Outcome::Quit);
        }

        let running = handle(command);
        tokio::pin!(running);
        loop {
            tokio::select! {
                biased;
                result = &mut running => {
                    result?;
                    break;
                }
                Some(next) = commands.recv() => {
                    if next == Command::Quit {
                        tracing::debug!(?command, "Quit while a command was running");
                        return Ok(Outcome::Quit);
                    }
                    backlog.push_back(next);
                }
            }
        }
    }
}

/// mpv refusing a command is not fatal; losing it is
fn tolerate(result: bramble_mpv::Result<()>) -> Result<()> {
    match result {
        Err(MpvError::Command { command, error }) => {
            tracing::warn!(%command, %error, "mpv rejected command");
            Ok(())
        }
        other => other.map_err(AppError::from),
    }
}

async fn shutdown_signal() -> Result<&'static str> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = hangup.recv() => "SIGHUP",
        _ = quit.recv() => "SIGQUIT",
    };
    tracing::info!("Received {}, shutting down", name);
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Finished.exit_code(), 0);
        assert_eq!(Outcome::Quit.exit_code(), 0);
        assert_eq!(Outcome::Interrupted("SIGTERM").exit_code(), 130);
    }

    #[test]
    fn test_tolerate_rejected_commands() {
        let rejected = Err(MpvError::Command {
            command: "cycle".to_string(),
            error: "property unavailable".to_string(),
        });
        assert!(tolerate(rejected).is_ok());
        assert!(matches!(
            tolerate(Err(MpvError::Closed)),
            Err(AppError::Player(MpvError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_quit_is_not_blocked_by_running_command() {
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(Command::Previous).await.unwrap();
        tx.send(Command::ToggleStar).await.unwrap();
        tx.send(Command::Quit).await.unwrap();

        let started = std::sync::Mutex::new(Vec::new());
        // Every command waits on the queue forever
        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            dispatch(&mut rx, |command| {
                started.lock().unwrap().push(command);
                std::future::pending::<Result<()>>()
            }),
        )
        .await
        .expect("quit should not wait for the running command");

        assert_eq!(outcome.unwrap(), Outcome::Quit);
        assert_eq!(*started.lock().unwrap(), [Command::Previous]);
    }

    #[tokio::test]
    async fn test_commands_run_in_order() {
        let (tx, mut rx) = mpsc::channel(16);
        for command in [Command::TogglePause, Command::Next, Command::ToggleMute, Command::Quit] {
            tx.send(command).await.unwrap();
        }

        let handled = std::sync::Mutex::new(Vec::new());
        let outcome = dispatch(&mut rx, |command| {
            handled.lock().unwrap().push(command);
            std::future::ready(Ok(()))
        })
        .await;

        assert_eq!(outcome.unwrap(), Outcome::Quit);
        assert_eq!(
            *handled.lock().unwrap(),
            [Command::TogglePause, Command::Next, Command::ToggleMute]
        );
    }

    #[tokio::test]
    async fn test_failed_command_ends_session() {
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(Command::Next).await.unwrap();

        let outcome = dispatch(&mut rx, |_| {
            std::future::ready(Err(AppError::Player(MpvError::Closed)))
        })
        .await;
        assert!(matches!(outcome, Err(AppError::Player(MpvError::Closed))));
    }
}
