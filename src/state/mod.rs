//! Shared player state observed by the front end.
//!
//! This module holds the snapshot type published by the engine and the
//! volume the user has chosen, which outlives individual songs.

pub mod app_state;
pub mod volume;

pub use {
    app_state::PlayerSnapshot,
    volume::{ControlRange, VolumeState},
};
