//! Playlist data model.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A song file and its position in the playlist it was assigned to.
///
/// The index is the position at assignment time, not a stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    path: PathBuf,
    index: usize,
}

impl Song {
    /// Creates a song at the given playlist index.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, index: usize) -> Self {
        Self {
            path: path.into(),
            index,
        }
    }

    /// Path to the audio file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Playlist position at assignment time.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// File name component of the path, lossily converted.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

impl Display for Song {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.index, self.file_name())
    }
}
