//! Game settings and preferences
//!
//! Persisted separately from level data as a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::beat_interval;
use crate::consts::{DEFAULT_BPM, TERMINAL_REVEAL_DELAY};
use crate::error::LevelFileError;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Beats per minute while a run is playing
    pub bpm: u32,
    /// Pause between a run's outcome and showing the result panel
    pub terminal_delay_secs: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Text renderer ===
    /// Print column/row numbers around the board
    pub show_coordinates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            terminal_delay_secs: TERMINAL_REVEAL_DELAY,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            show_coordinates: true,
        }
    }
}

impl Settings {
    /// Seconds per beat
    pub fn beat_interval(&self) -> f32 {
        beat_interval(self.bpm)
    }

    /// Load settings, falling back to defaults if the file is missing or bad
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(LevelFileError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, LevelFileError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LevelFileError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bpm, 120);
        assert!((settings.beat_interval() - 0.5).abs() < f32::EPSILON);
        assert!((settings.terminal_delay_secs - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "bpm": 90, "muted": true }"#).unwrap();
        assert_eq!(settings.bpm, 90);
        assert!(settings.muted);
        assert!((settings.master_volume - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings: Settings =
            serde_json::from_str(r#"{ "music_volume": 0.3, "sfx_volume": 0.5 }"#).unwrap();
        assert!((settings.sfx_volume - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load("/nonexistent/beatgrid/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("beatgrid-settings-{}.json", std::process::id()));
        let settings = Settings {
            bpm: 150,
            show_coordinates: false,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }
}
