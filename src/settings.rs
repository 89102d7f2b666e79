//! Game settings and preferences
//!
//! Persisted as a small JSON file next to the executable; a missing or
//! corrupt file falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Sound and music preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Sound effects (explosions, pickups, ambient room cues)
    pub sound_effects: bool,
    /// Background music; while it plays, ambient room cues stay quiet
    pub music: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_effects: true,
            music: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("loaded settings from {}", path.display());
                    return settings;
                }
                Err(err) => {
                    log::warn!("settings file {} is invalid: {err}", path.display());
                }
            },
            Err(_) => log::info!("using default settings"),
        }
        Self::default()
    }

    /// Save settings as JSON; failures are logged, never fatal
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    log::warn!("could not save settings to {}: {err}", path.display());
                } else {
                    log::info!("settings saved");
                }
            }
            Err(err) => log::warn!("could not serialize settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            sound_effects: false,
            music: true,
            master_volume: 0.5,
            sfx_volume: 0.25,
            music_volume: 1.0,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert!(!back.sound_effects);
        assert!(back.music);
        assert_eq!(back.master_volume, 0.5);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Path::new("definitely/not/here.json"));
        assert!(settings.sound_effects);
        assert!(!settings.music);
    }
}
