//! User intents mapped onto the player engine.
//!
//! Each public method takes the engine lock once, so an intent is applied
//! atomically with respect to other holders of the engine handle.

use std::{path::PathBuf, sync::Arc};

use {
    async_channel::Receiver,
    parking_lot::Mutex,
    rand::RngCore,
    tracing::{debug, info},
};

use crate::{
    audio::{clip::ClipOpener, engine::PlayerEngine},
    error::domain::PlaybackError,
    playlist::{PlaylistResolver, Song, secure_rng, shuffle},
    state::{
        app_state::PlayerSnapshot,
        volume::{ControlRange, VolumeState},
    },
};

/// Shared handle to the engine.
pub type EngineHandle<O> = Arc<Mutex<PlayerEngine<O>>>;

/// Front-end controller owning the user's volume and the shuffle source.
pub struct PlayerController<O: ClipOpener> {
    engine: EngineHandle<O>,
    volume: VolumeState,
    rng: Box<dyn RngCore + Send>,
}

impl<O: ClipOpener> PlayerController<O> {
    /// Creates a controller shuffling with an OS-seeded generator.
    pub fn new(opener: O) -> Self {
        Self::with_rng(opener, secure_rng())
    }

    /// Creates a controller with an explicit shuffle source.
    pub fn with_rng<R>(opener: O, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Self {
            engine: Arc::new(Mutex::new(PlayerEngine::new(opener))),
            volume: VolumeState::default(),
            rng: Box::new(rng),
        }
    }

    /// Shared handle to the engine.
    #[must_use]
    pub fn engine(&self) -> EngineHandle<O> {
        Arc::clone(&self.engine)
    }

    /// Current player snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.engine.lock().snapshot()
    }

    /// Subscribes to player snapshots.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<PlayerSnapshot> {
        self.engine.lock().subscribe()
    }

    /// Songs of the current playlist.
    #[must_use]
    pub fn playlist(&self) -> Vec<Song> {
        self.engine.lock().playlist().to_vec()
    }

    /// The stored volume level, if one has been chosen.
    #[must_use]
    pub fn volume(&self) -> Option<f64> {
        self.volume.level()
    }

    /// Loads the next song, resuming playback if the player was running.
    pub fn load_playlist_song(&mut self) -> Option<Song> {
        let mut engine = self.engine.lock();
        Self::step(&mut self.volume, &mut engine, true)
    }

    /// Loads the previous song, resuming playback if the player was running.
    pub fn load_prev_playlist_song(&mut self) -> Option<Song> {
        let mut engine = self.engine.lock();
        Self::step(&mut self.volume, &mut engine, false)
    }

    /// Loads and starts the song at `index`, wrapped into the playlist.
    pub fn play_specific(&mut self, index: i64) -> Option<Song> {
        let mut engine = self.engine.lock();
        let song = engine.load_specific_song(index)?;
        Self::apply_volume(&mut self.volume, &mut engine);
        engine.start();
        Some(song)
    }

    /// Loads a single file outside any playlist.
    ///
    /// The playlist is cleared and playback is not started.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NoClipLoaded` if the file could not be opened.
    pub fn play_single(&mut self, path: PathBuf) -> Result<Song, PlaybackError> {
        let mut engine = self.engine.lock();
        engine.set_playlist(Vec::new());
        let song = Song::new(path, 0);
        engine.change_song(song.clone());
        if !engine.has_clip() {
            return Err(PlaybackError::NoClipLoaded);
        }
        Self::apply_volume(&mut self.volume, &mut engine);
        Ok(song)
    }

    /// Toggles playback. A finished song starts over from the beginning.
    pub fn toggle_play(&mut self) {
        let mut engine = self.engine.lock();
        if engine.at_end() {
            engine.rewind_to_start();
            engine.start();
        } else if engine.is_playing() {
            engine.stop();
        } else {
            engine.start();
        }
    }

    /// Rewinds to the start, or to the previous song when already there.
    pub fn rewind(&mut self) -> Option<Song> {
        let mut engine = self.engine.lock();
        if engine.clip_position() == 0 && engine.has_playlist() {
            Self::step(&mut self.volume, &mut engine, false)
        } else {
            engine.rewind_to_start();
            None
        }
    }

    /// Stores and applies a volume in decibels, clamped to the control range.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NoClipLoaded` without an open clip.
    pub fn set_volume(&mut self, decibels: f64) -> Result<f64, PlaybackError> {
        let mut engine = self.engine.lock();
        if !engine.has_clip() {
            return Err(PlaybackError::NoClipLoaded);
        }
        let range = ControlRange::from_gain_bounds(engine.min_volume(), engine.max_volume());
        let level = self.volume.set(decibels, range);
        engine.volume_change(level);
        debug!("Volume set to {level:.1} dB");
        Ok(level)
    }

    /// Moves the playhead to `seconds` into the song.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NoClipLoaded` without an open clip.
    pub fn seek_seconds(&mut self, seconds: f64) -> Result<u64, PlaybackError> {
        let mut engine = self.engine.lock();
        let Some(rate) = engine.sample_rate() else {
            return Err(PlaybackError::NoClipLoaded);
        };

        let last_frame = engine.clip_length().saturating_sub(1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frame = ((seconds.max(0.0) * f64::from(rate)) as u64).min(last_frame);
        engine.set_song_position(frame);
        Ok(frame)
    }

    /// Refresh tick: advances past a finished song, otherwise announces.
    ///
    /// The end check is made against the live engine under the same lock
    /// as the advance, so a stale snapshot never skips a song.
    pub fn on_refresh(&mut self) -> Option<Song> {
        let mut engine = self.engine.lock();
        if engine.at_end() && engine.has_playlist() {
            debug!("Song finished, advancing");
            Self::step(&mut self.volume, &mut engine, true)
        } else {
            engine.announce_changes();
            None
        }
    }

    /// Resolves `paths` into a new playlist and starts its first song.
    ///
    /// # Returns
    ///
    /// The number of songs in the new playlist.
    pub fn open_paths(&mut self, paths: &[PathBuf], shuffled: bool) -> usize {
        let mut songs = PlaylistResolver::new().resolve(paths);
        if shuffled {
            shuffle(&mut songs, &mut *self.rng);
        }
        let count = songs.len();
        info!("Opening {count} songs (shuffled: {shuffled})");

        let mut engine = self.engine.lock();
        engine.set_playlist(songs);
        if engine.load_specific_song(0).is_some() {
            Self::apply_volume(&mut self.volume, &mut engine);
            engine.start();
        }
        count
    }

    fn step(
        volume: &mut VolumeState,
        engine: &mut PlayerEngine<O>,
        forward: bool,
    ) -> Option<Song> {
        let was_running = engine.is_running();
        engine.stop();
        let song = if forward {
            engine.load_next_song()
        } else {
            engine.load_prev_song()
        }?;
        Self::apply_volume(volume, engine);
        if was_running {
            engine.start();
        }
        Some(song)
    }

    fn apply_volume(volume: &mut VolumeState, engine: &mut PlayerEngine<O>) {
        if !engine.has_clip() {
            return;
        }
        let range = ControlRange::from_gain_bounds(engine.min_volume(), engine.max_volume());
        let level = volume.level_for(range);
        engine.volume_change(level);
    }
}
