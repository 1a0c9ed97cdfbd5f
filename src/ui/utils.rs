//! Text formatting for the terminal front end.

use crate::{audio::engine::PlaybackStatus, state::app_state::PlayerSnapshot};

/// Formats a sample rate in Hz as a kHz string without the unit.
///
/// - 48000 Hz → "48"
/// - 44100 Hz → "44.1"
/// - 22050 Hz → "22.05"
///
/// # Arguments
///
/// * `sample_rate_hz` - The sample rate in Hertz
///
/// # Returns
///
/// The rate in kHz with trailing zeros trimmed.
#[must_use]
pub fn format_sample_rate(sample_rate_hz: u32) -> String {
    let whole_khz = sample_rate_hz / 1000;
    let remainder = sample_rate_hz % 1000;

    if remainder == 0 {
        whole_khz.to_string()
    } else {
        let fraction = format!("{remainder:03}");
        format!("{whole_khz}.{}", fraction.trim_end_matches('0'))
    }
}

/// Formats a frame count as `m:ss` at the given sample rate.
#[must_use]
pub fn format_frames(frames: u64, sample_rate: u32) -> String {
    if sample_rate == 0 {
        return "0:00".to_string();
    }
    let seconds = frames / u64::from(sample_rate);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Short label for a playback status.
#[must_use]
pub fn status_label(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Empty => "No song",
        PlaybackStatus::Stopped => "Stopped",
        PlaybackStatus::Playing => "Playing",
        PlaybackStatus::Paused => "Paused",
        PlaybackStatus::AtEnd => "Finished",
    }
}

/// One-line summary of the player, e.g. `[Playing] 3: song.mp3  1:02 / 3:45  44.1 kHz`.
#[must_use]
pub fn format_status(snapshot: &PlayerSnapshot, title: Option<&str>) -> String {
    let label = status_label(snapshot.status);
    let Some(song) = snapshot.current_song.as_ref() else {
        return format!("[{label}]");
    };

    let name = title.map_or_else(|| song.to_string(), |title| format!("{}: {title}", song.index()));
    match snapshot.sample_rate {
        Some(rate) => format!(
            "[{label}] {name}  {} / {}  {} kHz",
            format_frames(snapshot.position, rate),
            format_frames(snapshot.length, rate),
            format_sample_rate(rate),
        ),
        None => format!("[{label}] {name}"),
    }
}
