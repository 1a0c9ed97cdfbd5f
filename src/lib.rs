//! Musiclist Player
//!
//! A small music player core: resolves files, folders and `.musiclist`
//! manifests into a playlist, shuffles it, and plays it through a
//! state machine over decoded clips, with a terminal front end.

pub mod audio;
pub mod config;
pub mod error;
pub mod playlist;
pub mod state;
pub mod ui;

// Re-export key types for convenience
pub use {
    audio::{
        clip::{AudioClip, ClipOpener},
        engine::{PlaybackStatus, PlayerEngine},
        output::DeviceClipOpener,
    },
    config::{SettingsManager, UserSettings},
    error::{PlaybackError, PlaylistError, UiError},
    playlist::{PlaylistResolver, Song, shuffle},
    state::PlayerSnapshot,
    ui::{PlayerApplication, PlayerController},
};
