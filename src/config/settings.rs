//! Player preferences stored under the XDG config directory.
//!
//! Settings live in `$XDG_CONFIG_HOME/musiclist-player/settings.json` as
//! pretty-printed JSON. Missing fields take their default values.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

use crate::audio::output::OutputConfig;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Serializable user settings with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Playlist opened when no paths are given on the command line.
    pub default_playlist: PathBuf,
    /// Interval between refresh ticks in milliseconds.
    pub refresh_interval_ms: u64,
    /// Whether newly opened playlists are shuffled.
    pub shuffle_on_load: bool,
    /// Audio output device name; the host default when unset.
    pub audio_device: Option<String>,
    /// Output buffer duration in milliseconds.
    pub buffer_duration_ms: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_playlist: PathBuf::from("all.musiclist"),
            refresh_interval_ms: 2000,
            shuffle_on_load: true,
            audio_device: None,
            buffer_duration_ms: 50,
        }
    }
}

impl UserSettings {
    /// Checks values that would make the player unusable.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for a zero refresh interval or
    /// zero buffer duration.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.refresh_interval_ms == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "refresh_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.buffer_duration_ms == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "buffer_duration_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Output configuration derived from these settings.
    #[must_use]
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            device_name: self.audio_device.clone(),
            buffer_duration_ms: self.buffer_duration_ms,
        }
    }
}

/// Handles loading, saving, and validation of user preferences.
#[derive(Debug)]
pub struct SettingsManager {
    /// Settings read at startup.
    settings: UserSettings,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a settings manager backed by the default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a settings manager backed by `config_path`.
    ///
    /// A missing file is created with the default settings so they can be
    /// edited by hand.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Path of the settings file
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file cannot be read, written, parsed,
    /// or holds invalid values.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let manager = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            let settings: UserSettings = from_str(&contents)?;
            settings.validate()?;
            SettingsManager {
                settings,
                config_path,
            }
        } else {
            let manager = SettingsManager {
                settings: UserSettings::default(),
                config_path,
            };
            manager.save_settings()?;
            manager
        };

        Ok(manager)
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&self.settings)?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Path of the settings file under the XDG config directory.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("musiclist-player");
    config_dir.push("settings.json");
    config_dir
}

/// Uses `XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{read_to_string, write},
        io::{Error, ErrorKind::NotFound},
        path::PathBuf,
    };

    use {
        serde_json::{from_str, to_string},
        tempfile::tempdir,
    };

    use crate::config::settings::{SettingsError, SettingsManager, UserSettings};

    #[test]
    fn test_user_settings_default() {
        let settings = UserSettings::default();
        assert_eq!(settings.default_playlist, PathBuf::from("all.musiclist"));
        assert_eq!(settings.refresh_interval_ms, 2000);
        assert!(settings.shuffle_on_load);
        assert!(settings.audio_device.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_user_settings_serialization() {
        let settings = UserSettings {
            default_playlist: PathBuf::from("/music/favourites.musiclist"),
            refresh_interval_ms: 500,
            shuffle_on_load: false,
            audio_device: Some("Test Device".to_string()),
            buffer_duration_ms: 100,
        };

        let serialized = to_string(&settings).unwrap();
        let deserialized: UserSettings = from_str(&serialized).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: UserSettings = from_str(r#"{"shuffle_on_load": false}"#).unwrap();
        assert!(!settings.shuffle_on_load);
        assert_eq!(settings.refresh_interval_ms, 2000);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, r#"{"refresh_interval_ms": 0}"#).unwrap();

        let result = SettingsManager::with_config_path(path);
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_file_written_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();
        assert_eq!(*manager.get_settings(), UserSettings::default());

        let written: UserSettings = from_str(&read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, UserSettings::default());
    }

    #[test]
    fn test_existing_file_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, r#"{"shuffle_on_load": false}"#).unwrap();

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();

        assert!(!manager.get_settings().shuffle_on_load);
        assert_eq!(
            read_to_string(&path).unwrap(),
            r#"{"shuffle_on_load": false}"#
        );
    }

    #[test]
    fn test_settings_error_display() {
        let io_error = Error::new(NotFound, "File not found");
        let settings_error = SettingsError::IoError(io_error);
        assert!(settings_error.to_string().contains("IO error"));

        let invalid_value_error = SettingsError::InvalidValue {
            reason: "test reason".to_string(),
        };
        assert_eq!(
            invalid_value_error.to_string(),
            "Invalid settings value: test reason"
        );
    }
}
