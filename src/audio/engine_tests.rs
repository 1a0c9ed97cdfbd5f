//! State machine tests against scripted clips.

use std::path::PathBuf;

use crate::audio::{
    clip::GainRange,
    engine::{NEAR_END_FRAMES, PlaybackStatus, PlayerEngine},
    testing::{ClipEvent, ScriptedOpener},
};

const LENGTH: u64 = 200_000;

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| PathBuf::from(format!("/music/{name}")))
        .collect()
}

fn loaded_engine() -> (PlayerEngine<ScriptedOpener>, ScriptedOpener) {
    let opener = ScriptedOpener::new(LENGTH);
    let mut engine = PlayerEngine::new(opener.clone());
    engine.set_playlist(paths(&["a.mp3", "b.wav", "c.mp3"]));
    engine.load_specific_song(0);
    (engine, opener)
}

#[test]
fn test_empty_engine_queries() {
    let engine = PlayerEngine::new(ScriptedOpener::new(LENGTH));

    assert_eq!(engine.status(), PlaybackStatus::Empty);
    assert!(!engine.has_clip());
    assert!(!engine.has_playlist());
    assert!(!engine.at_end());
    assert!(!engine.is_running());
    assert_eq!(engine.clip_length(), 0);
    assert_eq!(engine.clip_position(), 0);
    assert_eq!(engine.min_volume(), 0.0);
    assert_eq!(engine.max_volume(), 1.0);
    assert!(engine.current_song().is_none());
}

#[test]
fn test_empty_engine_ignores_controls() {
    let opener = ScriptedOpener::new(LENGTH);
    let mut engine = PlayerEngine::new(opener.clone());

    engine.start();
    engine.stop();
    engine.set_song_position(10);
    engine.rewind_to_start();
    engine.volume_change(-3.0);

    assert!(opener.events().is_empty());
    assert!(engine.load_next_song().is_none());
    assert!(engine.load_prev_song().is_none());
    assert!(engine.load_specific_song(4).is_none());
}

#[test]
fn test_load_is_stopped_at_start() {
    let (engine, _) = loaded_engine();

    assert_eq!(engine.status(), PlaybackStatus::Stopped);
    assert_eq!(engine.clip_position(), 0);
    assert_eq!(engine.clip_length(), LENGTH);
    assert_eq!(engine.current_song().unwrap().file_name(), "a.mp3");
    assert_eq!(engine.min_volume(), f64::from(GainRange::MASTER.min_db));
    assert_eq!(engine.max_volume(), f64::from(GainRange::MASTER.max_db));
}

#[test]
fn test_start_and_stop() {
    let (mut engine, opener) = loaded_engine();

    engine.start();
    engine.start();
    assert!(engine.is_playing());
    assert_eq!(engine.status(), PlaybackStatus::Playing);

    opener.play_to(1_000);
    engine.stop();
    engine.stop();
    assert!(!engine.is_playing());
    assert_eq!(engine.status(), PlaybackStatus::Paused);

    let starts = opener
        .events()
        .iter()
        .filter(|event| **event == ClipEvent::Started)
        .count();
    let stops = opener
        .events()
        .iter()
        .filter(|event| **event == ClipEvent::Stopped)
        .count();
    assert_eq!((starts, stops), (1, 1));
}

#[test]
fn test_at_end_boundaries() {
    let (engine, opener) = loaded_engine();

    opener.play_to(LENGTH - NEAR_END_FRAMES - 1);
    assert!(!engine.at_end());

    opener.play_to(LENGTH - NEAR_END_FRAMES);
    assert!(engine.at_end());
    assert_eq!(engine.status(), PlaybackStatus::AtEnd);

    opener.play_to(LENGTH);
    assert!(engine.at_end());
}

#[test]
fn test_is_running_counts_finished_clip() {
    let (engine, opener) = loaded_engine();

    opener.play_to(LENGTH);
    assert!(!engine.is_playing());
    assert!(engine.is_running());
}

#[test]
fn test_seek_preserves_running_state() {
    let (mut engine, opener) = loaded_engine();

    engine.set_song_position(5_000);
    assert!(!engine.is_playing());
    assert_eq!(engine.clip_position(), 5_000);

    engine.start();
    engine.set_song_position(9_000);
    assert!(engine.is_playing());
    assert_eq!(engine.clip_position(), 9_000);

    let events = opener.events();
    let tail = &events[events.len() - 3..];
    assert_eq!(
        tail,
        [ClipEvent::Stopped, ClipEvent::Seek(9_000), ClipEvent::Started]
    );

    engine.rewind_to_start();
    assert_eq!(engine.clip_position(), 0);
    assert!(engine.is_playing());
}

#[test]
fn test_volume_midpoint_maps_to_minimum() {
    let (mut engine, opener) = loaded_engine();
    let midpoint = (engine.min_volume() + engine.max_volume()) / 2.0;

    engine.volume_change(midpoint);
    assert_eq!(opener.state().lock().gain, Some(GainRange::MASTER.min_db));

    engine.volume_change(-12.5);
    assert_eq!(opener.state().lock().gain, Some(-12.5));
}

#[test]
fn test_close_before_open() {
    let (mut engine, opener) = loaded_engine();

    engine.load_next_song();

    let events = opener.events();
    let closed = events
        .iter()
        .position(|event| *event == ClipEvent::Closed(PathBuf::from("/music/a.mp3")))
        .unwrap();
    let opened = events
        .iter()
        .position(|event| *event == ClipEvent::Opened(PathBuf::from("/music/b.wav")))
        .unwrap();
    assert!(closed < opened);
}

#[test]
fn test_failed_load_leaves_engine_empty() {
    let opener = ScriptedOpener::new(LENGTH);
    let mut engine = PlayerEngine::new(opener.clone());
    engine.set_playlist(paths(&["a.mp3", "broken.mp3"]));
    engine.load_specific_song(0);
    engine.start();

    let song = engine.load_next_song().unwrap();

    assert_eq!(song.file_name(), "broken.mp3");
    assert_eq!(engine.status(), PlaybackStatus::Empty);
    assert!(engine.current_song().is_none());
    assert!(engine.has_playlist());

    engine.start();
    engine.set_song_position(100);
    assert!(!engine.is_running());
    assert!(
        opener
            .events()
            .contains(&ClipEvent::Closed(PathBuf::from("/music/a.mp3")))
    );
}

#[test]
fn test_navigation_wraps() {
    let (mut engine, _) = loaded_engine();

    assert_eq!(engine.load_prev_song().unwrap().index(), 2);
    assert_eq!(engine.load_next_song().unwrap().index(), 0);
    assert_eq!(engine.load_specific_song(-1).unwrap().index(), 2);
    assert_eq!(engine.load_specific_song(7).unwrap().index(), 1);
    assert_eq!(engine.current_index(), 1);
    assert_eq!(engine.current_song().unwrap().file_name(), "b.wav");
}

#[test]
fn test_set_playlist_keeps_open_clip() {
    let (mut engine, _) = loaded_engine();
    engine.load_specific_song(2);

    engine.set_playlist(paths(&["x.mp3", "y.mp3"]));

    assert_eq!(engine.current_index(), 0);
    assert_eq!(engine.playlist().len(), 2);
    assert_eq!(engine.current_song().unwrap().file_name(), "c.mp3");
}

#[test]
fn test_subscribers_receive_snapshots() {
    let (mut engine, _) = loaded_engine();
    let receiver = engine.subscribe();

    let initial = receiver.try_recv().unwrap();
    assert_eq!(initial.status, PlaybackStatus::Stopped);

    engine.start();
    let started = receiver.try_recv().unwrap();
    assert_eq!(started.status, PlaybackStatus::Playing);
    assert!(started.is_running);

    engine.announce_changes();
    assert!(receiver.try_recv().is_ok());
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_closed_subscribers_pruned() {
    let (mut engine, _) = loaded_engine();
    let kept = engine.subscribe();
    let dropped = engine.subscribe();
    assert_eq!(engine.subscriber_count(), 2);

    drop(dropped);
    engine.announce_changes();

    assert_eq!(engine.subscriber_count(), 1);
    assert_eq!(kept.len(), 2);
}
