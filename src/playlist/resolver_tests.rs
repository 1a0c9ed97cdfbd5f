//! Tests for playlist resolution against real directory trees.

use std::{
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};

use tempfile::{TempDir, tempdir};

use crate::playlist::resolver::{PlaylistResolver, is_manifest_file, is_song_file};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).unwrap();
    }
    write(path, b"").unwrap();
}

fn names(songs: &[PathBuf]) -> Vec<String> {
    songs
        .iter()
        .map(|song| song.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn library() -> TempDir {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.mp3"));
    touch(&dir.path().join("sub/b.wav"));
    touch(&dir.path().join("sub/notes.txt"));
    touch(&dir.path().join("sub/deeper/c.mp3"));
    dir
}

#[test]
fn test_manifest_with_directory_and_duplicate() {
    let dir = library();
    let root = dir.path();
    let manifest = root.join("root.musiclist");
    write(
        &manifest,
        format!(
            "{}\n{}\n{}\n",
            root.join("a.mp3").display(),
            root.join("sub").display(),
            root.join("a.mp3").display(),
        ),
    )
    .unwrap();

    let songs = PlaylistResolver::new().resolve_path(&manifest);

    assert_eq!(names(&songs), vec!["a.mp3", "b.wav", "c.mp3"]);
}

#[test]
fn test_nested_manifest_listed_twice() {
    let dir = tempdir().unwrap();
    let songs = dir.path().join("songs");
    touch(&songs.join("a.mp3"));
    touch(&songs.join("b.wav"));
    touch(&songs.join("c.mp3"));
    write(songs.join("sub.musiclist"), "c.mp3\n").unwrap();
    let root = dir.path().join("root.musiclist");
    write(&root, "songs/\nsongs/sub.musiclist\n").unwrap();

    let resolved = PlaylistResolver::new().resolve_path(&root);

    assert_eq!(names(&resolved), vec!["a.mp3", "b.wav", "c.mp3"]);
}

#[test]
fn test_directory_entries_sorted() {
    let dir = tempdir().unwrap();
    for name in ["zeta.mp3", "alpha.wav", "mid.mp3"] {
        touch(&dir.path().join(name));
    }

    let songs = PlaylistResolver::new().resolve_path(dir.path());

    assert_eq!(names(&songs), vec!["alpha.wav", "mid.mp3", "zeta.mp3"]);
}

#[test]
fn test_relative_manifest_entries() {
    let dir = library();
    let manifest = dir.path().join("relative.musiclist");
    write(&manifest, "sub/deeper\r\n\r\na.mp3\r\n").unwrap();

    let songs = PlaylistResolver::new().resolve_path(&manifest);

    assert_eq!(names(&songs), vec!["c.mp3", "a.mp3"]);
}

#[test]
fn test_missing_entries_skipped() {
    let dir = library();
    let manifest = dir.path().join("list.musiclist");
    write(&manifest, "missing.mp3\nno/such/dir\na.mp3\n").unwrap();

    let songs = PlaylistResolver::new().resolve([manifest, dir.path().join("nope.wav")]);

    assert_eq!(names(&songs), vec!["a.mp3"]);
}

#[test]
fn test_self_referencing_manifest() {
    let dir = library();
    let manifest = dir.path().join("loop.musiclist");
    write(&manifest, "loop.musiclist\na.mp3\nloop.musiclist\n").unwrap();

    let songs = PlaylistResolver::new().resolve_path(&manifest);

    assert_eq!(names(&songs), vec!["a.mp3"]);
}

#[test]
fn test_mutually_referencing_manifests() {
    let dir = library();
    write(dir.path().join("one.musiclist"), "two.musiclist\na.mp3\n").unwrap();
    write(dir.path().join("two.musiclist"), "one.musiclist\nsub/b.wav\n").unwrap();

    let songs = PlaylistResolver::new().resolve_path(dir.path().join("one.musiclist"));

    assert_eq!(names(&songs), vec!["b.wav", "a.mp3"]);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_terminates() {
    use std::os::unix::fs::symlink;

    let dir = library();
    symlink(dir.path(), dir.path().join("sub/back_to_root")).unwrap();

    let songs = PlaylistResolver::new().resolve_path(dir.path());

    assert_eq!(names(&songs), vec!["a.mp3", "b.wav", "c.mp3"]);
}

#[test]
fn test_same_directory_listed_twice() {
    let dir = library();
    let sub = dir.path().join("sub");

    let songs = PlaylistResolver::new().resolve([&sub.join("deeper"), &sub, &sub]);

    assert_eq!(names(&songs), vec!["c.mp3", "b.wav"]);
}

#[test]
fn test_invalid_manifest_does_not_stop_siblings() {
    let dir = library();
    let broken = dir.path().join("broken.musiclist");
    write(&broken, [0xff, 0xfe, 0xfd]).unwrap();

    let songs = PlaylistResolver::new().resolve([broken, dir.path().join("sub")]);

    assert_eq!(names(&songs), vec!["b.wav", "c.mp3"]);
}

#[test]
fn test_extension_checks_case_insensitive() {
    assert!(is_song_file(Path::new("/music/LOUD.MP3")));
    assert!(is_song_file(Path::new("take.Wav")));
    assert!(!is_song_file(Path::new("cover.jpg")));
    assert!(!is_song_file(Path::new("mp3")));
    assert!(is_manifest_file(Path::new("Party.MusicList")));
    assert!(!is_manifest_file(Path::new("party.m3u")));
}

#[test]
fn test_uppercase_files_resolved() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("A.MP3"));
    touch(&dir.path().join("b.flac"));
    write(dir.path().join("c.MUSICLIST"), "A.MP3\n").unwrap();

    let songs = PlaylistResolver::new().resolve_path(dir.path());

    assert_eq!(names(&songs), vec!["A.MP3"]);
}
