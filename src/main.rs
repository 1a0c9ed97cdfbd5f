//! Musiclist Player - terminal music player
//!
//! Resolves the given files, folders and `.musiclist` manifests into a
//! playlist, shuffles it and plays it, taking commands from stdin.

use std::{
    io::{stderr, stdout},
    path::PathBuf,
};

use {
    anyhow::Result,
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use musiclist_player::{
    config::SettingsManager,
    error::{ErrorReporter, ResultExt},
    ui::PlayerApplication,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "musiclist-player")]
#[command(about = "Plays songs, folders and .musiclist playlists")]
#[command(version)]
struct Args {
    /// Songs, folders or .musiclist manifests to play
    paths: Vec<PathBuf>,

    /// Keep the resolved order instead of shuffling
    #[arg(long)]
    no_shuffle: bool,

    /// Settings file to use instead of the XDG default
    #[arg(short, long, env = "MUSICLIST_PLAYER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "musiclist_player=info".into()),
        )
        .with(fmt::layer().with_writer(stderr))
        .init();

    let args = Args::parse();

    let settings = match args.config {
        Some(path) => SettingsManager::with_config_path(path),
        None => SettingsManager::new(),
    }
    .add_context("Failed to load settings")?;
    info!("Settings loaded from {:?}", settings.get_config_path());

    let mut user_settings = settings.get_settings().clone();
    if args.no_shuffle {
        user_settings.shuffle_on_load = false;
    }
    let mut app = PlayerApplication::from_settings(user_settings);

    if let Err(e) = app.startup(args.paths, &mut stdout()) {
        ErrorReporter::error(&e, "startup");
        return Err(e);
    }

    app.run().await
}
