//! Playlist construction: resolving paths and manifests, ordering and shuffling.

pub mod manifest;
pub mod models;
pub mod queue;
pub mod resolver;
pub mod shuffle;

#[cfg(test)]
mod resolver_tests;

pub use {
    models::Song,
    queue::PlaylistQueue,
    resolver::{PlaylistResolver, is_manifest_file, is_song_file},
    shuffle::{secure_rng, shuffle},
};
