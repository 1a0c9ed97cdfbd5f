//! Domain-specific error types using `thiserror`.
//!
//! This module defines the main error enums for the different domains of
//! the player: clip playback, playlist resolution and the terminal front end.

use std::{io::Error as StdError, path::PathBuf, result::Result as StdResult};

use {anyhow::Error, thiserror::Error};

use crate::audio::{decoder::DecoderError, metadata::MetadataError, output::OutputError};

/// Playback-related errors.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Decoder error from the clip decoder.
    #[error("Decoder error: {0}")]
    DecoderError(#[from] DecoderError),
    /// Output error from the audio device.
    #[error("Output error: {0}")]
    OutputError(#[from] OutputError),
    /// Metadata error while reading tags.
    #[error("Metadata error: {0}")]
    MetadataError(#[from] MetadataError),
    /// The operation needs a loaded clip.
    #[error("No clip loaded")]
    NoClipLoaded,
}

/// Playlist resolution errors.
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// A `.musiclist` manifest could not be read.
    #[error("Failed to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: StdError,
    },
    /// A directory listing could not be read.
    #[error("Failed to read directory {path:?}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: StdError,
    },
    /// A path could not be canonicalized.
    #[error("Failed to resolve path {path:?}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: StdError,
    },
}

/// Front-end errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UiError {
    /// The command word is not recognised.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    /// The command was recognised but its argument is missing or malformed.
    #[error("Invalid argument for '{command}': {reason}")]
    InvalidArgument { command: String, reason: String },
}

/// Operational error context propagation with `anyhow`.
///
/// This type is used for operational errors that need rich context
/// but don't require specific handling logic.
pub type Result<T> = StdResult<T, Error>;
