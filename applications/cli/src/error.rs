/// Application error types
use bramble_catalog::CatalogError;
use bramble_mpv::MpvError;
use bramble_queue::QueueError;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Playback error: {0}")]
    Player(#[from] MpvError),

    #[error("mpv exited unexpectedly ({0})")]
    PlayerExited(ExitStatus),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
