//! `.musiclist` manifest parsing.
//!
//! A manifest is a UTF-8 text file with one path per line. Trailing
//! carriage returns are stripped and blank lines are ignored.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::error::domain::PlaylistError;

/// Splits manifest text into its entries.
#[must_use]
pub fn parse_manifest(text: &str) -> Vec<PathBuf> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Reads a manifest from disk.
///
/// Relative entries are resolved against the directory containing the
/// manifest.
///
/// # Errors
///
/// Returns `PlaylistError::ManifestRead` if the file cannot be read or is
/// not valid UTF-8.
pub fn read_manifest(path: &Path) -> Result<Vec<PathBuf>, PlaylistError> {
    let text = read_to_string(path).map_err(|source| PlaylistError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    Ok(parse_manifest(&text)
        .into_iter()
        .map(|entry| {
            if entry.is_absolute() {
                entry
            } else {
                base.join(entry)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::{fs::write, path::PathBuf};

    use tempfile::tempdir;

    use crate::{
        error::domain::PlaylistError,
        playlist::manifest::{parse_manifest, read_manifest},
    };

    #[test]
    fn test_parse_strips_carriage_returns_and_blank_lines() {
        let entries = parse_manifest("/a.mp3\r\n\r\n/b.wav\n\n/c dir\n");
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/a.mp3"),
                PathBuf::from("/b.wav"),
                PathBuf::from("/c dir"),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_surrounding_spaces() {
        let entries = parse_manifest(" spaced.mp3 \n");
        assert_eq!(entries, vec![PathBuf::from(" spaced.mp3 ")]);
    }

    #[test]
    fn test_read_resolves_relative_entries() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.musiclist");
        write(&manifest, "song.mp3\n/abs/other.wav\n").unwrap();

        let entries = read_manifest(&manifest).unwrap();

        assert_eq!(
            entries,
            vec![dir.path().join("song.mp3"), PathBuf::from("/abs/other.wav")]
        );
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("broken.musiclist");
        write(&manifest, [0x66, 0x6f, 0xff, 0xfe, b'\n']).unwrap();

        let result = read_manifest(&manifest);
        assert!(matches!(result, Err(PlaylistError::ManifestRead { .. })));
    }
}
