//! Core types for queue management

use crate::error::{QueueError, Result};
use serde::{Deserialize, Serialize};

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the playlist is exhausted
    Off,

    /// Loop the playlist as resolved at startup
    All,

    /// Loop, re-resolving the playlist from the catalog before every pass
    #[default]
    Reload,
}

impl RepeatMode {
    /// Build from the two independent command-line switches.
    pub fn from_flags(repeat: bool, reload: bool) -> Self {
        match (repeat, reload) {
            (false, _) => RepeatMode::Off,
            (true, false) => RepeatMode::All,
            (true, true) => RepeatMode::Reload,
        }
    }
}

/// Shuffle mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuffleMode {
    /// Catalog order
    #[default]
    Off,

    /// Pure random shuffle
    Random,

    /// Smart shuffle (distribute artists)
    Smart,
}

/// Configuration for the prefetch queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of entries kept downloaded ahead of the playing one (default: 3)
    pub depth: usize,

    /// Shuffle applied to every pass (default: Off)
    pub shuffle: ShuffleMode,

    /// Behaviour at the end of a pass (default: Reload)
    pub repeat: RepeatMode,
}

impl QueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(QueueError::InvalidConfig(
                "lookahead depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            shuffle: ShuffleMode::Off,
            repeat: RepeatMode::Reload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.depth, 3);
        assert_eq!(config.shuffle, ShuffleMode::Off);
        assert_eq!(config.repeat, RepeatMode::Reload);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_depth_rejected() {
        let config = QueueConfig {
            depth: 0,
            ..QueueConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(QueueError::InvalidConfig(_))
        ));
    }

    #[test]
    fn repeat_from_flags() {
        assert_eq!(RepeatMode::from_flags(false, true), RepeatMode::Off);
        assert_eq!(RepeatMode::from_flags(true, false), RepeatMode::All);
        assert_eq!(RepeatMode::from_flags(true, true), RepeatMode::Reload);
    }
}
