//! Keyboard input in raw terminal mode

use crate::error::{AppError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// What a keystroke asks the player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    ToggleMute,
    Previous,
    Next,
    ToggleStar,
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char('m') => Some(Command::ToggleMute),
        KeyCode::Char('p' | '<') => Some(Command::Previous),
        KeyCode::Char('n' | '>') => Some(Command::Next),
        KeyCode::Char('s' | '*') => Some(Command::ToggleStar),
        _ => None,
    }
}

/// Raw mode for as long as this value lives
#[derive(Debug)]
pub struct RawMode(());

impl RawMode {
    pub fn enable() -> Result<Self> {
        enable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
        Ok(Self(()))
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Read keys on a blocking thread until `tx` is closed
pub fn spawn_reader(tx: mpsc::Sender<Command>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!("Terminal input failed: {}", e);
                break;
            }
        }
        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(command) = command_for(key) {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Terminal input failed: {}", e);
                break;
            }
        }
    })
}
