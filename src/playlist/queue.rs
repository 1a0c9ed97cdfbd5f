//! Playlist ordering and cursor.
//!
//! The cursor always points into the song list after a move; moving past
//! either end wraps around.

use std::path::PathBuf;

use crate::playlist::models::Song;

/// An ordered list of songs with a wrapping cursor.
#[derive(Debug, Clone, Default)]
pub struct PlaylistQueue {
    /// Songs in play order.
    songs: Vec<Song>,
    /// Index of the current song.
    cursor: usize,
}

impl PlaylistQueue {
    /// Replaces the whole playlist, numbering songs from 0 and resetting the cursor.
    pub fn replace<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.songs = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Song::new(path, index))
            .collect();
        self.cursor = 0;
    }

    /// Songs in play order.
    #[must_use]
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Number of songs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the playlist has no songs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Current cursor value.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Song under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Song> {
        self.songs.get(self.cursor)
    }

    /// Moves forward one song, wrapping to the first after the last.
    pub fn advance_next(&mut self) -> Option<Song> {
        if self.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.len();
        self.current().cloned()
    }

    /// Moves back one song, wrapping to the last before the first.
    pub fn advance_prev(&mut self) -> Option<Song> {
        if self.is_empty() {
            return None;
        }
        self.cursor = self.cursor.checked_sub(1).unwrap_or(self.len() - 1);
        self.current().cloned()
    }

    /// Moves to `index`, wrapped modulo the playlist length in both directions.
    pub fn jump_to(&mut self, index: i64) -> Option<Song> {
        if self.is_empty() {
            return None;
        }
        let len = i64::try_from(self.len()).unwrap_or(i64::MAX);
        self.cursor = usize::try_from(index.rem_euclid(len)).unwrap_or(0);
        self.current().cloned()
    }
}
