//! Expansion of files, directories and manifests into a flat song list.
//!
//! Traversal is depth-first over an explicit work-list, so deeply nested
//! trees never grow the call stack. Every directory and manifest is keyed
//! by its canonical path in a visited-set before it is expanded, which
//! stops symlink loops and manifests that include themselves.

use std::{
    collections::HashSet,
    fs::{canonicalize, read_dir},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{error::domain::PlaylistError, playlist::manifest::read_manifest};

/// Extensions of files that can be played.
pub const SONG_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// Extension of playlist manifest files.
pub const MANIFEST_EXTENSION: &str = "musiclist";

/// Returns `true` if the path has a playable extension (case-insensitive).
#[must_use]
pub fn is_song_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            SONG_EXTENSIONS
                .iter()
                .any(|&ext| ext.eq_ignore_ascii_case(extension))
        })
}

/// Returns `true` if the path has the manifest extension (case-insensitive).
#[must_use]
pub fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| MANIFEST_EXTENSION.eq_ignore_ascii_case(extension))
}

/// Resolves root paths into an ordered, duplicate-free list of songs.
///
/// # Examples
///
/// ```no_run
/// use musiclist_player::playlist::PlaylistResolver;
///
/// let songs = PlaylistResolver::new().resolve(["all.musiclist", "/music/jazz"]);
/// println!("{} songs", songs.len());
/// ```
#[derive(Debug, Default)]
pub struct PlaylistResolver {
    /// Canonical paths of directories and manifests already expanded.
    visited: HashSet<PathBuf>,
    /// Canonical paths of songs already emitted.
    seen_songs: HashSet<PathBuf>,
}

impl PlaylistResolver {
    /// Creates a resolver with empty visited-sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a single root path.
    pub fn resolve_path<P: AsRef<Path>>(&mut self, root: P) -> Vec<PathBuf> {
        self.resolve([root])
    }

    /// Resolves every root in order and concatenates the results.
    ///
    /// Unreadable manifests and directories are logged and skipped.
    /// Entries that do not exist and files of other types are ignored.
    pub fn resolve<I, P>(&mut self, roots: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut pending: Vec<PathBuf> = roots
            .into_iter()
            .map(|root| root.as_ref().to_path_buf())
            .collect();
        pending.reverse();

        let mut songs = Vec::new();
        while let Some(path) = pending.pop() {
            if let Err(e) = self.visit(path, &mut pending, &mut songs) {
                warn!("{e}");
            }
        }

        debug!("Resolved {} songs", songs.len());
        songs
    }

    /// Processes one work-list entry, queueing any children it expands to.
    fn visit(
        &mut self,
        path: PathBuf,
        pending: &mut Vec<PathBuf>,
        songs: &mut Vec<PathBuf>,
    ) -> Result<(), PlaylistError> {
        if !path.exists() {
            debug!("Skipping missing entry {:?}", path);
            return Ok(());
        }

        if path.is_dir() {
            if !self.visited.insert(canonical(&path)?) {
                debug!("Already visited directory {:?}", path);
                return Ok(());
            }
            let children = sorted_entries(&path)?;
            pending.extend(children.into_iter().rev());
        } else if is_song_file(&path) {
            if self.seen_songs.insert(canonical(&path)?) {
                songs.push(path);
            }
        } else if is_manifest_file(&path) {
            if !self.visited.insert(canonical(&path)?) {
                debug!("Already expanded manifest {:?}", path);
                return Ok(());
            }
            let entries = read_manifest(&path)?;
            pending.extend(entries.into_iter().rev());
        }

        Ok(())
    }
}

fn canonical(path: &Path) -> Result<PathBuf, PlaylistError> {
    canonicalize(path).map_err(|source| PlaylistError::Canonicalize {
        path: path.to_path_buf(),
        source,
    })
}

/// Lists a directory's entries sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, PlaylistError> {
    let entries = read_dir(dir).map_err(|source| PlaylistError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut children: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}
