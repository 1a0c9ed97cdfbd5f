//! Song tag extraction using the `lofty` crate.
//!
//! Used by the front end to show a readable title for the song that is
//! playing. Files without tags fall back to their file name.

use std::path::Path;

use {
    lofty::{
        error::LoftyError,
        prelude::{AudioFile, TaggedFileExt},
        probe::Probe,
        tag::Accessor,
    },
    serde::{Deserialize, Serialize},
    thiserror::Error,
    tracing::debug,
};

/// Error type for metadata extraction operations.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Failed to read or parse the audio file.
    #[error("Failed to read audio file: {0}")]
    ReadError(#[from] LoftyError),
}

/// Tag information for one song.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongTags {
    /// Track title.
    pub title: Option<String>,
    /// Track artist.
    pub artist: Option<String>,
    /// Album name.
    pub album: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl SongTags {
    /// Formats the tags as `"Artist - Title"`, or just the title.
    #[must_use]
    pub fn display_title(&self) -> Option<String> {
        let title = self.title.as_deref()?.trim();
        if title.is_empty() {
            return None;
        }
        match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => Some(format!("{artist} - {title}")),
            _ => Some(title.to_string()),
        }
    }
}

/// Reads song tags.
///
/// # Examples
///
/// ```no_run
/// use musiclist_player::audio::metadata::TagReader;
///
/// println!("Now playing: {}", TagReader::display_title("/music/song.mp3"));
/// ```
pub struct TagReader;

impl TagReader {
    /// Reads the primary tag and audio properties of a file.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if the file cannot be read or parsed.
    pub fn read_tags<P: AsRef<Path>>(path: P) -> Result<SongTags, MetadataError> {
        let tagged_file = Probe::open(path.as_ref())?.read()?;
        let duration_ms =
            u64::try_from(tagged_file.properties().duration().as_millis()).unwrap_or(u64::MAX);

        let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        else {
            return Ok(SongTags {
                duration_ms,
                ..SongTags::default()
            });
        };

        Ok(SongTags {
            title: tag.title().map(|title| title.to_string()),
            artist: tag.artist().map(|artist| artist.to_string()),
            album: tag.album().map(|album| album.to_string()),
            duration_ms,
        })
    }

    /// Returns a title suitable for display, falling back to the file name.
    pub fn display_title<P: AsRef<Path>>(path: P) -> String {
        let path = path.as_ref();
        match Self::read_tags(path) {
            Ok(tags) => tags.display_title(),
            Err(e) => {
                debug!("No tags for {:?}: {e}", path);
                None
            }
        }
        .unwrap_or_else(|| {
            path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().to_string(),
            )
        })
    }
}
