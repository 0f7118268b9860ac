/// Bramble - Subsonic playlist player
use anyhow::Context;
use bramble::{config::LoggingSettings, session, Cli, Outcome, Settings};
use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("bramble: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    settings.apply_cli(cli);

    init_tracing(&settings.logging)?;

    if cli.list {
        settings.validate_server()?;
        session::list_playlists(&settings).await?;
        return Ok(Outcome::Finished);
    }

    settings.validate()?;
    tracing::info!(
        url = %settings.server.url,
        playlist = %settings.playback.playlist,
        "Starting Bramble"
    );

    Ok(session::run(&settings).await?)
}

fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}
