//! Audio playback system.
//!
//! Songs are decoded in full with symphonia, played through a cpal output
//! stream, and driven by the `PlayerEngine` state machine through the
//! `AudioClip` seam.

pub mod clip;
pub mod decoder;
pub mod engine;
pub mod metadata;
pub mod output;

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
pub(crate) mod testing;

pub use {
    clip::{AudioClip, ClipOpener, GainRange},
    engine::{PlaybackStatus, PlayerEngine},
    output::{DeviceClipOpener, OutputConfig},
};
