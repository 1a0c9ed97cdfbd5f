//! Terminal front end.
//!
//! This module implements `PlayerApplication`, which reads commands from
//! stdin, drives the refresh tick and prints the player state whenever the
//! song or status changes.

use std::{
    io::{Write, stdout},
    path::PathBuf,
    time::Duration,
};

use {
    anyhow::Result,
    tokio::{
        io::{AsyncBufReadExt, BufReader, stdin},
        select,
        time::{MissedTickBehavior, interval},
    },
    tracing::{debug, info},
};

use crate::{
    audio::{clip::ClipOpener, metadata::TagReader, output::DeviceClipOpener},
    config::UserSettings,
    error::operational::{ErrorReporter, ResultExt},
    state::app_state::PlayerSnapshot,
    ui::{
        commands::{Command, HELP},
        controller::PlayerController,
        utils::format_status,
    },
};

/// Whether the command loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal music player.
pub struct PlayerApplication<O: ClipOpener> {
    /// Controller for user intents.
    controller: PlayerController<O>,
    /// Settings read at startup.
    settings: UserSettings,
    /// Last snapshot printed.
    last_shown: Option<PlayerSnapshot>,
    /// Display title of the current song.
    title: Option<String>,
}

impl PlayerApplication<DeviceClipOpener> {
    /// Creates an application playing through the configured output device.
    #[must_use]
    pub fn from_settings(settings: UserSettings) -> Self {
        let opener = DeviceClipOpener::new(settings.output_config());
        Self::new(PlayerController::new(opener), settings)
    }
}

impl<O: ClipOpener> PlayerApplication<O> {
    /// Creates an application around an existing controller.
    pub fn new(controller: PlayerController<O>, settings: UserSettings) -> Self {
        Self {
            controller,
            settings,
            last_shown: None,
            title: None,
        }
    }

    /// Opens the startup playlist and lists it.
    ///
    /// Uses `paths` when given, otherwise the default playlist if it exists.
    /// The playlist is shuffled when `shuffle_on_load` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn startup<W: Write>(
        &mut self,
        paths: Vec<PathBuf>,
        out: &mut W,
    ) -> Result<usize> {
        let roots = if paths.is_empty() {
            let default = self.settings.default_playlist.clone();
            if !default.exists() {
                writeln!(
                    out,
                    "No paths given and {} not found. Use 'open <path>' to start.",
                    default.display()
                )?;
                return Ok(0);
            }
            vec![default]
        } else {
            paths
        };

        let count = self
            .controller
            .open_paths(&roots, self.settings.shuffle_on_load);
        self.write_playlist(out)?;
        Ok(count)
    }

    /// Executes one command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be carried out, for example
    /// seeking without a loaded song.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        debug!("Executing {command:?}");
        match command {
            Command::TogglePlay => self.controller.toggle_play(),
            Command::Next => {
                self.controller.load_playlist_song();
            }
            Command::Prev => {
                self.controller.load_prev_playlist_song();
            }
            Command::Rewind => {
                self.controller.rewind();
            }
            Command::Seek(seconds) => {
                self.controller
                    .seek_seconds(seconds)
                    .add_context("Cannot seek")?;
            }
            Command::Volume(decibels) => {
                let level = self
                    .controller
                    .set_volume(decibels)
                    .add_context("Cannot change volume")?;
                writeln!(out, "Volume {level:.1} dB")?;
            }
            Command::Jump(index) => {
                if self.controller.play_specific(index).is_none() {
                    writeln!(out, "Playlist is empty")?;
                }
            }
            Command::List => self.write_playlist(out)?,
            Command::Open(paths) => {
                let count = self.controller.open_paths(&paths, self.settings.shuffle_on_load);
                writeln!(out, "Opened {count} songs")?;
            }
            Command::Load(path) => {
                self.controller
                    .play_single(path.clone())
                    .add_contextf(format!("Cannot load {}", path.display()))?;
            }
            Command::Status => {
                let snapshot = self.controller.snapshot();
                writeln!(out, "{}", format_status(&snapshot, self.title.as_deref()))?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Prints `snapshot` if its song or status differs from the last one shown.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn render<W: Write>(&mut self, snapshot: PlayerSnapshot, out: &mut W) -> Result<()> {
        if self
            .last_shown
            .as_ref()
            .is_some_and(|last| !last.differs_visibly(&snapshot))
        {
            return Ok(());
        }

        let song_changed = self
            .last_shown
            .as_ref()
            .is_none_or(|last| last.current_song != snapshot.current_song);
        if song_changed {
            self.title = snapshot
                .current_song
                .as_ref()
                .map(|song| TagReader::display_title(song.path()));
        }

        writeln!(out, "{}", format_status(&snapshot, self.title.as_deref()))?;
        self.last_shown = Some(snapshot);
        Ok(())
    }

    /// Runs the command loop until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout fail.
    pub async fn run(mut self) -> Result<()> {
        let snapshots = self.controller.subscribe();
        let mut lines = BufReader::new(stdin()).lines();
        let mut ticker = interval(Duration::from_millis(self.settings.refresh_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut out = stdout();

        writeln!(out, "Type 'help' for commands.")?;
        loop {
            select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => match self.execute(command, &mut out) {
                            Ok(Flow::Quit) => break,
                            Ok(Flow::Continue) => {}
                            Err(e) => {
                                ErrorReporter::warn(&e, "command");
                                writeln!(out, "{}", ErrorReporter::to_user_message(&e))?;
                            }
                        },
                        Err(e) => writeln!(out, "{e}. Type 'help' for commands.")?,
                    }
                }
                _ = ticker.tick() => {
                    if let Some(song) = self.controller.on_refresh() {
                        debug!("Advanced to {song}");
                    }
                }
                Ok(snapshot) = snapshots.recv() => {
                    self.render(snapshot, &mut out)?;
                }
            }
        }

        info!("Exiting");
        Ok(())
    }

    fn write_playlist<W: Write>(&self, out: &mut W) -> Result<()> {
        let snapshot = self.controller.snapshot();
        let playlist = self.controller.playlist();
        if playlist.is_empty() {
            writeln!(out, "Playlist is empty")?;
            return Ok(());
        }

        for song in &playlist {
            let marker = if song.index() == snapshot.current_index {
                '>'
            } else {
                ' '
            };
            writeln!(out, "{marker} {song}")?;
        }
        Ok(())
    }
}
