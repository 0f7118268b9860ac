//! Track progress display

use bramble_catalog::Track;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

const TEMPLATE: &str = "{msg} [{bar:40}] {pos:>3}%";

/// One progress bar per playing track on stderr
#[derive(Default)]
pub struct Display {
    current: Mutex<Option<ProgressBar>>,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a bar for `track`, replacing any unfinished one
    pub fn start(&self, track: &Track, starred: bool) {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr())
            .with_style(style)
            .with_message(now_playing(track, starred));

        if let Some(previous) = self.slot().replace(bar) {
            previous.finish_and_clear();
        }
    }

    pub fn set_percent(&self, percent: f64) {
        if let Some(bar) = self.slot().as_ref() {
            bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
        }
    }

    pub fn set_starred(&self, track: &Track, starred: bool) {
        if let Some(bar) = self.slot().as_ref() {
            bar.set_message(now_playing(track, starred));
        }
    }

    /// Replace the bar with a summary line
    pub fn finish(&self, track: &Track) {
        if let Some(bar) = self.slot().take() {
            bar.finish_and_clear();
        }
        line(&played(track));
    }

    /// Print a line above the bar
    pub fn notice(&self, message: &str) {
        match self.slot().as_ref() {
            Some(bar) => bar.suspend(|| line(message)),
            None => line(message),
        }
    }

    pub fn clear(&self) {
        if let Some(bar) = self.slot().take() {
            bar.finish_and_clear();
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// Raw mode needs the explicit carriage return
fn line(text: &str) {
    eprint!("{}\r\n", text);
}

/// Bar label, e.g. `|> Artist : Title *`
pub fn now_playing(track: &Track, starred: bool) -> String {
    let marker = if starred { " *" } else { "" };
    format!("|> {} : {}{}", track.artist, track.title, marker)
}

/// Line left behind once a track is done
pub fn played(track: &Track) -> String {
    format!("=> {} - {}", track.artist, track.title)
}
