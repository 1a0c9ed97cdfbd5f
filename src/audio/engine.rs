//! Playback state machine.
//!
//! This module provides `PlayerEngine`, which owns the playlist, the single
//! open clip and the list of snapshot subscribers. Every song change closes
//! the previous clip before the next one is opened.

use std::path::PathBuf;

use {
    async_channel::{Receiver, Sender, unbounded},
    serde::{Deserialize, Serialize},
    tracing::{debug, error, info},
};

use crate::{
    audio::clip::{AudioClip, ClipOpener},
    playlist::{Song, queue::PlaylistQueue},
    state::app_state::PlayerSnapshot,
};

/// Frames before the end of a clip that already count as finished.
pub const NEAR_END_FRAMES: u64 = 50_000;

/// Coarse playback status derived from the open clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No clip is open.
    Empty,
    /// A clip is open at its first frame and not running.
    Stopped,
    /// The clip is running.
    Playing,
    /// The clip is halted part way through.
    Paused,
    /// The clip is within `NEAR_END_FRAMES` of its end.
    AtEnd,
}

/// Player state machine over a pluggable clip backend.
///
/// # Examples
///
/// ```no_run
/// use musiclist_player::audio::{engine::PlayerEngine, output::DeviceClipOpener};
///
/// let mut engine = PlayerEngine::new(DeviceClipOpener::default());
/// engine.set_playlist(vec!["/music/a.mp3".into(), "/music/b.wav".into()]);
/// engine.load_specific_song(0);
/// engine.start();
/// ```
pub struct PlayerEngine<O: ClipOpener> {
    /// Backend used to open songs.
    opener: O,
    /// The currently open clip.
    clip: Option<O::Clip>,
    /// Song the open clip was loaded from.
    current: Option<Song>,
    /// Playlist and cursor.
    queue: PlaylistQueue,
    /// Snapshot subscribers.
    subscribers: Vec<Sender<PlayerSnapshot>>,
}

impl<O: ClipOpener> PlayerEngine<O> {
    /// Creates an engine with no clip and an empty playlist.
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            clip: None,
            current: None,
            queue: PlaylistQueue::default(),
            subscribers: Vec::new(),
        }
    }

    /// Closes the open clip, if any, and opens `song`.
    ///
    /// A song that cannot be opened is logged and leaves the engine empty.
    /// Subscribers are notified either way.
    pub fn change_song(&mut self, song: Song) {
        if let Some(previous) = self.clip.take() {
            debug!("Closing clip for {:?}", self.current.as_ref().map(Song::path));
            drop(previous);
        }
        self.current = None;

        match self.opener.open(song.path()) {
            Ok(clip) => {
                info!("Loaded {song}");
                self.clip = Some(clip);
                self.current = Some(song);
            }
            Err(e) => error!("Failed to load {:?}: {e}", song.path()),
        }

        self.announce_changes();
    }

    /// Starts playback if a clip is open and not already running.
    pub fn start(&mut self) {
        if let Some(clip) = self.clip.as_mut()
            && !clip.is_running()
        {
            debug!("Starting playback");
            clip.start();
            self.announce_changes();
        }
    }

    /// Halts playback if the clip is running.
    pub fn stop(&mut self) {
        if let Some(clip) = self.clip.as_mut()
            && clip.is_running()
        {
            debug!("Stopping playback");
            clip.stop();
            self.announce_changes();
        }
    }

    /// Moves the playhead to `frame`, resuming if the clip was running.
    ///
    /// Frames past the end are clamped by the clip backend.
    pub fn set_song_position(&mut self, frame: u64) {
        let Some(clip) = self.clip.as_mut() else {
            return;
        };

        let was_running = clip.is_running();
        if was_running {
            clip.stop();
        }
        clip.set_frame_position(frame);
        if was_running {
            clip.start();
        }
        debug!("Moved playhead to frame {frame}");
        self.announce_changes();
    }

    /// Moves the playhead back to the first frame.
    pub fn rewind_to_start(&mut self) {
        self.set_song_position(0);
    }

    /// Applies a gain in decibels to the open clip.
    ///
    /// The exact midpoint of the clip's gain range is the "mute" setting of
    /// the volume control and maps to the clip's minimum gain.
    pub fn volume_change(&mut self, decibels: f64) {
        let Some(clip) = self.clip.as_mut() else {
            return;
        };

        let range = clip.gain_range();
        #[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
        let gain = if decibels == range.midpoint() {
            range.min_db
        } else {
            decibels as f32
        };
        clip.set_gain(gain);
    }

    /// Whether the playhead is within `NEAR_END_FRAMES` of the end.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.clip.as_ref().is_some_and(|clip| {
            clip.frame_length().saturating_sub(clip.frame_position()) <= NEAR_END_FRAMES
        })
    }

    /// Whether the clip is physically producing sound.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.clip.as_ref().is_some_and(AudioClip::is_running)
    }

    /// Whether the player should be treated as running.
    ///
    /// A clip that has reached its end counts as running even after the
    /// device stops, so the refresh tick advances to the next song instead
    /// of leaving the player idle.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_playing() || self.at_end()
    }

    /// Current coarse status.
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        let Some(clip) = self.clip.as_ref() else {
            return PlaybackStatus::Empty;
        };

        if self.at_end() {
            PlaybackStatus::AtEnd
        } else if clip.is_running() {
            PlaybackStatus::Playing
        } else if clip.frame_position() == 0 {
            PlaybackStatus::Stopped
        } else {
            PlaybackStatus::Paused
        }
    }

    /// Advances the cursor and loads the next song, wrapping at the end.
    pub fn load_next_song(&mut self) -> Option<Song> {
        let song = self.queue.advance_next()?;
        self.change_song(song.clone());
        Some(song)
    }

    /// Moves the cursor back and loads that song, wrapping at the start.
    pub fn load_prev_song(&mut self) -> Option<Song> {
        let song = self.queue.advance_prev()?;
        self.change_song(song.clone());
        Some(song)
    }

    /// Loads the song at `index`, wrapped modulo the playlist length.
    pub fn load_specific_song(&mut self, index: i64) -> Option<Song> {
        let song = self.queue.jump_to(index)?;
        self.change_song(song.clone());
        Some(song)
    }

    /// Replaces the playlist. Songs are numbered from 0 and the cursor reset.
    ///
    /// The open clip, if any, keeps playing.
    pub fn set_playlist(&mut self, paths: Vec<PathBuf>) {
        info!("Playlist set with {} songs", paths.len());
        self.queue.replace(paths);
        self.announce_changes();
    }

    /// Whether a clip is open.
    #[must_use]
    pub fn has_clip(&self) -> bool {
        self.clip.is_some()
    }

    /// Whether the playlist holds any songs.
    #[must_use]
    pub fn has_playlist(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Length of the open clip in frames, 0 without a clip.
    #[must_use]
    pub fn clip_length(&self) -> u64 {
        self.clip.as_ref().map_or(0, AudioClip::frame_length)
    }

    /// Playhead of the open clip in frames, 0 without a clip.
    #[must_use]
    pub fn clip_position(&self) -> u64 {
        self.clip.as_ref().map_or(0, AudioClip::frame_position)
    }

    /// Sample rate of the open clip.
    #[must_use]
    pub fn sample_rate(&self) -> Option<u32> {
        self.clip.as_ref().map(AudioClip::sample_rate)
    }

    /// Lowest gain of the open clip, 0.0 without a clip.
    #[must_use]
    pub fn min_volume(&self) -> f64 {
        self.clip
            .as_ref()
            .map_or(0.0, |clip| f64::from(clip.gain_range().min_db))
    }

    /// Highest gain of the open clip, 1.0 without a clip.
    #[must_use]
    pub fn max_volume(&self) -> f64 {
        self.clip
            .as_ref()
            .map_or(1.0, |clip| f64::from(clip.gain_range().max_db))
    }

    /// Songs in play order.
    #[must_use]
    pub fn playlist(&self) -> &[Song] {
        self.queue.songs()
    }

    /// Playlist cursor.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.queue.cursor()
    }

    /// Song the open clip was loaded from.
    #[must_use]
    pub fn current_song(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    /// Derived state as seen by subscribers.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status(),
            has_clip: self.has_clip(),
            is_running: self.is_running(),
            at_end: self.at_end(),
            position: self.clip_position(),
            length: self.clip_length(),
            sample_rate: self.sample_rate(),
            min_volume: self.min_volume(),
            max_volume: self.max_volume(),
            current_index: self.current_index(),
            playlist_len: self.queue.len(),
            current_song: self.current.clone(),
        }
    }

    /// Subscribes to snapshots.
    ///
    /// # Returns
    ///
    /// A `Receiver` that gets the current snapshot immediately and a new one
    /// after every change and every refresh tick.
    #[must_use]
    pub fn subscribe(&mut self) -> Receiver<PlayerSnapshot> {
        let (tx, rx) = unbounded();
        let _ = tx.try_send(self.snapshot());
        self.subscribers.push(tx);
        rx
    }

    /// Sends the current snapshot to every subscriber, dropping closed ones.
    pub fn announce_changes(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }

        let snapshot = self.snapshot();
        self.subscribers
            .retain(|subscriber| subscriber.try_send(snapshot.clone()).is_ok());
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
