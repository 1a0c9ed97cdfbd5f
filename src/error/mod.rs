//! Error handling using `thiserror` and `anyhow`.
//!
//! Domain-specific error types for precise handling, plus operational
//! context propagation for the binary and the front end.

pub mod domain;
pub mod operational;

pub use {
    domain::{PlaybackError, PlaylistError, UiError},
    operational::{ErrorReporter, ResultExt},
};
