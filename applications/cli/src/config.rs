/// Player configuration
use crate::cli::Cli;
use crate::error::{AppError, Result};
use bramble_catalog::{AuthMode, CatalogConfig};
use bramble_queue::{QueueConfig, RepeatMode, ShuffleMode, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "bramble.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_logging")]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub auth: AuthMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub playlist: String,

    #[serde(default)]
    pub shuffle: ShuffleMode,

    #[serde(default = "default_true")]
    pub repeat: bool,

    #[serde(default = "default_true")]
    pub reload_on_repeat: bool,

    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Percent of a track that must be heard before it is scrobbled
    #[serde(default = "default_scrobble_threshold")]
    pub scrobble_threshold: u8,

    #[serde(default = "default_mpv")]
    pub mpv: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// `EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Settings {
    /// Load from the config file and `BRAMBLE_*` environment variables
    ///
    /// An explicit `path` must exist; otherwise `bramble.toml` in the
    /// working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// As [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // BRAMBLE_PLAYBACK__DEPTH=5 sets playback.depth
        settings = settings.add_source(
            config::Environment::with_prefix("BRAMBLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Command-line values win over file and environment
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.server.url.clone_from(url);
        }
        if let Some(user) = &cli.user {
            self.server.user.clone_from(user);
        }
        if let Some(password) = &cli.password {
            self.server.password.clone_from(password);
        }
        if let Some(playlist) = &cli.playlist {
            self.playback.playlist.clone_from(playlist);
        }
        if let Some(shuffle) = cli.shuffle_mode() {
            self.playback.shuffle = shuffle;
        }
        if let Some(repeat) = cli.repeat_flag() {
            self.playback.repeat = repeat;
        }
        if let Some(reload) = cli.reload_flag() {
            self.playback.reload_on_repeat = reload;
        }
        if let Some(depth) = cli.depth {
            self.playback.depth = depth;
        }
        if cli.log_file.is_some() {
            self.logging.file.clone_from(&cli.log_file);
        }
    }

    /// Check what is needed to reach the server
    pub fn validate_server(&self) -> Result<()> {
        let missing = [
            ("server URL", &self.server.url, "--url or SONIC_URL"),
            ("username", &self.server.user, "--user or SONIC_USER"),
            ("password", &self.server.password, "--password or SONIC_PASSWORD"),
        ];
        for (what, value, hint) in missing {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} is required (set {})", what, hint)));
            }
        }
        Ok(())
    }

    /// Check everything a playback session needs
    pub fn validate(&self) -> Result<()> {
        self.validate_server()?;

        if self.playback.playlist.trim().is_empty() {
            return Err(AppError::Config(
                "playlist is required (set --playlist or SONIC_PLAYLIST)".to_string(),
            ));
        }
        if self.playback.depth == 0 {
            return Err(AppError::Config("depth must be at least 1".to_string()));
        }
        if self.playback.scrobble_threshold > 100 {
            return Err(AppError::Config(format!(
                "scrobble threshold must be within 0..=100, got {}",
                self.playback.scrobble_threshold
            )));
        }
        Ok(())
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(&self.server.url, &self.server.user, &self.server.password)
            .with_auth(self.server.auth)
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            depth: self.playback.depth,
            shuffle: self.playback.shuffle,
            repeat: RepeatMode::from_flags(self.playback.repeat, self.playback.reload_on_repeat),
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: String::new(),
        user: String::new(),
        password: String::new(),
        auth: AuthMode::default(),
    }
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        playlist: String::new(),
        shuffle: ShuffleMode::default(),
        repeat: default_true(),
        reload_on_repeat: default_true(),
        depth: default_depth(),
        scrobble_threshold: default_scrobble_threshold(),
        mpv: default_mpv(),
    }
}

fn default_logging() -> LoggingSettings {
    LoggingSettings {
        file: None,
        filter: default_filter(),
    }
}

fn default_true() -> bool {
    true
}

fn default_depth() -> usize {
    QueueConfig::default().depth
}

fn default_scrobble_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_mpv() -> PathBuf {
    PathBuf::from("mpv")
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: default_server(),
            playback: default_playback(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn complete() -> Settings {
        let mut settings = Settings::default();
        settings.server.url = "https://music.example.com".to_string();
        settings.server.user = "alice".to_string();
        settings.server.password = "sesame".to_string();
        settings.playback.playlist = "Road Trip".to_string();
        settings
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.playback.shuffle, ShuffleMode::Off);
        assert!(settings.playback.repeat);
        assert!(settings.playback.reload_on_repeat);
        assert_eq!(settings.playback.depth, 3);
        assert_eq!(settings.playback.scrobble_threshold, 75);
        assert_eq!(settings.playback.mpv, PathBuf::from("mpv"));
        assert_eq!(settings.server.auth, AuthMode::Token);
        assert_eq!(settings.logging.filter, "warn");
        assert_eq!(settings.queue_config().repeat, RepeatMode::Reload);
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
            [server]
            url = "https://music.example.com"
            user = "alice"
            auth = "plain"

            [playback]
            playlist = "Focus"
            shuffle = "smart"
            repeat = false
            depth = 5
            "#,
        );

        let settings = Settings::load_from(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.server.url, "https://music.example.com");
        assert_eq!(settings.server.auth, AuthMode::Plain);
        assert_eq!(settings.playback.playlist, "Focus");
        assert_eq!(settings.playback.shuffle, ShuffleMode::Smart);
        assert_eq!(settings.playback.depth, 5);
        assert_eq!(settings.queue_config().repeat, RepeatMode::Off);
        // Untouched sections keep their defaults
        assert_eq!(settings.playback.scrobble_threshold, 75);
        assert_eq!(settings.logging.filter, "warn");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Settings::load_from(Some(Path::new("/nonexistent/bramble.toml")), no_env());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("[playback]\ndepth = 5\nplaylist = \"Focus\"\n");
        let settings = Settings::load_from(
            Some(file.path()),
            env(&[
                ("BRAMBLE_PLAYBACK__DEPTH", "7"),
                ("BRAMBLE_SERVER__PASSWORD", "hunter2"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.playback.depth, 7);
        assert_eq!(settings.playback.playlist, "Focus");
        assert_eq!(settings.server.password, "hunter2");
    }

    #[test]
    fn test_cli_overrides_everything() {
        let file = write_config("[playback]\ndepth = 5\nrepeat = true\n");
        let mut settings = Settings::load_from(
            Some(file.path()),
            env(&[("BRAMBLE_PLAYBACK__DEPTH", "7")]),
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "bramble",
            "--url",
            "http://localhost:4533",
            "--user",
            "bob",
            "--password",
            "pw",
            "--playlist",
            "Mix",
            "--depth",
            "2",
            "--no-repeat",
            "--shuffle",
        ])
        .unwrap();
        settings.apply_cli(&cli);

        assert_eq!(settings.server.url, "http://localhost:4533");
        assert_eq!(settings.server.user, "bob");
        assert_eq!(settings.playback.playlist, "Mix");
        assert_eq!(settings.playback.depth, 2);
        assert!(!settings.playback.repeat);
        assert_eq!(settings.playback.shuffle, ShuffleMode::Random);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_credentials_and_playlist() {
        assert!(complete().validate().is_ok());

        let mut settings = complete();
        settings.server.url.clear();
        assert!(matches!(settings.validate(), Err(AppError::Config(msg)) if msg.contains("URL")));

        let mut settings = complete();
        settings.server.password = "  ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = complete();
        settings.playback.playlist.clear();
        assert!(settings.validate_server().is_ok());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let mut settings = complete();
        settings.playback.depth = 0;
        assert!(settings.validate().is_err());

        let mut settings = complete();
        settings.playback.scrobble_threshold = 101;
        assert!(settings.validate().is_err());

        let mut settings = complete();
        settings.playback.scrobble_threshold = 100;
        assert!(settings.validate().is_ok());
    }
}
