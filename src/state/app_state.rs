//! Player state as published to observers.

use serde::{Deserialize, Serialize};

use crate::{audio::engine::PlaybackStatus, playlist::Song};

/// Point-in-time view of the player, sent to every subscriber after each
/// change and on every refresh tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Coarse playback status.
    pub status: PlaybackStatus,
    /// Whether a clip is open.
    pub has_clip: bool,
    /// Playing, or finished but not yet advanced.
    pub is_running: bool,
    /// Within the end margin of the clip.
    pub at_end: bool,
    /// Playhead in frames.
    pub position: u64,
    /// Clip length in frames.
    pub length: u64,
    /// Frames per second of the open clip.
    pub sample_rate: Option<u32>,
    /// Lowest gain in decibels.
    pub min_volume: f64,
    /// Highest gain in decibels.
    pub max_volume: f64,
    /// Playlist cursor.
    pub current_index: usize,
    /// Number of songs in the playlist.
    pub playlist_len: usize,
    /// Song the open clip was loaded from.
    pub current_song: Option<Song>,
}

impl PlayerSnapshot {
    /// Whether the displayed song or status differs from `other`.
    #[must_use]
    pub fn differs_visibly(&self, other: &Self) -> bool {
        self.status != other.status || self.current_song != other.current_song
    }
}
