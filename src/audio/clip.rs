//! The clip abstraction between the player and the host audio stack.
//!
//! A clip is one fully decoded song that can be started, stopped,
//! repositioned and attenuated. The player only ever talks to these traits,
//! so the device-backed implementation in `output` can be swapped for a
//! scripted one in tests.

use std::path::Path;

use crate::error::domain::PlaybackError;

/// Decibel bounds of a clip's master gain control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRange {
    /// Lowest accepted gain in decibels.
    pub min_db: f32,
    /// Highest accepted gain in decibels.
    pub max_db: f32,
}

impl GainRange {
    /// Master gain bounds used by device clips: -80 dB floor, +6.02 dB (2x) ceiling.
    pub const MASTER: Self = Self {
        min_db: -80.0,
        max_db: 6.020_6,
    };

    /// Midpoint of the range, computed in `f64` like every volume query.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (f64::from(self.min_db) + f64::from(self.max_db)) / 2.0
    }

    /// Clamps a gain value into the range.
    #[must_use]
    pub fn clamp(&self, decibels: f32) -> f32 {
        decibels.clamp(self.min_db, self.max_db)
    }
}

/// Converts a decibel gain into a linear amplitude factor.
#[must_use]
pub fn db_to_linear(decibels: f32) -> f32 {
    10.0_f32.powf(decibels / 20.0)
}

/// A loaded, decoded song ready for playback.
///
/// Dropping a clip closes it and releases its device resources.
pub trait AudioClip: Send {
    /// Starts or resumes playback from the current frame.
    fn start(&mut self);

    /// Halts playback, keeping the current frame.
    fn stop(&mut self);

    /// Whether frames are currently being played.
    fn is_running(&self) -> bool;

    /// Total number of frames in the clip.
    fn frame_length(&self) -> u64;

    /// Index of the next frame to be played.
    fn frame_position(&self) -> u64;

    /// Moves the playback cursor.
    fn set_frame_position(&mut self, frame: u64);

    /// Frames per second of the decoded PCM.
    fn sample_rate(&self) -> u32;

    /// Bounds of the master gain control.
    fn gain_range(&self) -> GainRange;

    /// Sets the master gain in decibels.
    fn set_gain(&mut self, decibels: f32);
}

/// Opens songs as clips.
pub trait ClipOpener {
    /// The clip type produced by this opener.
    type Clip: AudioClip;

    /// Opens and fully decodes the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` if the file cannot be read, decoded, or
    /// attached to an output device.
    fn open(&self, path: &Path) -> Result<Self::Clip, PlaybackError>;
}
