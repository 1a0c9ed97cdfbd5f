//! In-memory clips for exercising the player without an audio device.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    audio::{
        clip::{AudioClip, ClipOpener, GainRange},
        decoder::DecoderError,
    },
    error::domain::PlaybackError,
};

/// Something that happened to a scripted clip.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ClipEvent {
    Opened(PathBuf),
    Closed(PathBuf),
    Started,
    Stopped,
    Seek(u64),
    Gain(f32),
}

/// State shared by every clip a `ScriptedOpener` hands out.
#[derive(Debug)]
pub(crate) struct ClipState {
    pub length: u64,
    pub position: u64,
    pub running: bool,
    pub gain: Option<f32>,
    pub sample_rate: u32,
    pub gain_range: GainRange,
    pub events: Vec<ClipEvent>,
}

/// Opens `ScriptedClip`s; file names containing `broken` fail to open.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedOpener {
    state: Arc<Mutex<ClipState>>,
}

impl ScriptedOpener {
    pub fn new(length: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClipState {
                length,
                position: 0,
                running: false,
                gain: None,
                sample_rate: 44_100,
                gain_range: GainRange::MASTER,
                events: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> Arc<Mutex<ClipState>> {
        Arc::clone(&self.state)
    }

    pub fn events(&self) -> Vec<ClipEvent> {
        self.state.lock().events.clone()
    }

    /// Moves the playhead as if the device had played up to `frame`.
    pub fn play_to(&self, frame: u64) {
        self.state.lock().position = frame;
    }
}

impl ClipOpener for ScriptedOpener {
    type Clip = ScriptedClip;

    fn open(&self, path: &Path) -> Result<ScriptedClip, PlaybackError> {
        if path.to_string_lossy().contains("broken") {
            return Err(DecoderError::NoAudioTrack.into());
        }

        let mut state = self.state.lock();
        state.position = 0;
        state.running = false;
        state.gain = None;
        state.events.push(ClipEvent::Opened(path.to_path_buf()));

        Ok(ScriptedClip {
            path: path.to_path_buf(),
            state: Arc::clone(&self.state),
        })
    }
}

/// A clip whose playhead only moves when a test moves it.
#[derive(Debug)]
pub(crate) struct ScriptedClip {
    path: PathBuf,
    state: Arc<Mutex<ClipState>>,
}

impl AudioClip for ScriptedClip {
    fn start(&mut self) {
        let mut state = self.state.lock();
        state.running = true;
        state.events.push(ClipEvent::Started);
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.events.push(ClipEvent::Stopped);
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn frame_length(&self) -> u64 {
        self.state.lock().length
    }

    fn frame_position(&self) -> u64 {
        self.state.lock().position
    }

    fn set_frame_position(&mut self, frame: u64) {
        let mut state = self.state.lock();
        state.position = frame.min(state.length);
        state.events.push(ClipEvent::Seek(frame));
    }

    fn sample_rate(&self) -> u32 {
        self.state.lock().sample_rate
    }

    fn gain_range(&self) -> GainRange {
        self.state.lock().gain_range
    }

    fn set_gain(&mut self, decibels: f32) {
        let mut state = self.state.lock();
        state.gain = Some(decibels);
        state.events.push(ClipEvent::Gain(decibels));
    }
}

impl Drop for ScriptedClip {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.events.push(ClipEvent::Closed(self.path.clone()));
    }
}
