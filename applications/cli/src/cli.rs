//! Command-line arguments

use bramble_queue::ShuffleMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bramble")]
#[command(about = "Play Subsonic playlists through mpv", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subsonic username
    #[arg(short, long, env = "SONIC_USER")]
    pub user: Option<String>,

    /// Subsonic password
    #[arg(long, env = "SONIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Server URL, e.g. https://music.example.com
    #[arg(long, env = "SONIC_URL")]
    pub url: Option<String>,

    /// Name of the playlist to play
    #[arg(short, long, env = "SONIC_PLAYLIST")]
    pub playlist: Option<String>,

    /// Shuffle every pass; `smart` spreads artists out
    #[arg(
        long,
        value_enum,
        num_args = 0..=1,
        default_missing_value = "random",
        overrides_with = "no_shuffle"
    )]
    pub shuffle: Option<ShuffleArg>,

    #[arg(long, overrides_with = "shuffle")]
    pub no_shuffle: bool,

    /// Start over when the playlist ends
    #[arg(long, overrides_with = "no_repeat")]
    pub repeat: bool,

    #[arg(long, overrides_with = "repeat")]
    pub no_repeat: bool,

    /// Fetch the playlist again before each repeat
    #[arg(long, overrides_with = "no_reload_on_repeat")]
    pub reload_on_repeat: bool,

    #[arg(long, overrides_with = "reload_on_repeat")]
    pub no_reload_on_repeat: bool,

    /// Number of tracks downloaded ahead
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Configuration file (default: bramble.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write logs here instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the server's playlists and exit
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShuffleArg {
    Random,
    Smart,
}

impl From<ShuffleArg> for ShuffleMode {
    fn from(arg: ShuffleArg) -> Self {
        match arg {
            ShuffleArg::Random => ShuffleMode::Random,
            ShuffleArg::Smart => ShuffleMode::Smart,
        }
    }
}

impl Cli {
    /// Shuffle requested on the command line, if any
    pub fn shuffle_mode(&self) -> Option<ShuffleMode> {
        if self.no_shuffle {
            Some(ShuffleMode::Off)
        } else {
            self.shuffle.map(ShuffleMode::from)
        }
    }

    pub fn repeat_flag(&self) -> Option<bool> {
        switch(self.repeat, self.no_repeat)
    }

    pub fn reload_flag(&self) -> Option<bool> {
        switch(self.reload_on_repeat, self.no_reload_on_repeat)
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
