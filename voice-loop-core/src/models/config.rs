use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration for the voice loop.
///
/// The audio format is not configurable; every capture uses
/// [`AudioFormatSpec::VOICE`](super::audio_models::AudioFormatSpec::VOICE).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoopConfiguration {
    /// Fixed location of the most recent capture. Overwritten on every take.
    pub recording_path: PathBuf,

    /// Apply a wireless hands-free input as preferred when one is present
    /// (default: true).
    pub prefer_wireless_input: bool,

    /// Let the play-and-record session route through wireless accessories
    /// (default: true).
    pub allow_wireless_accessories: bool,
}

impl LoopConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.recording_path.as_os_str().is_empty() {
            return Err("recording path must not be empty".into());
        }
        if self.recording_path.is_dir() {
            return Err(format!(
                "recording path is a directory: {}",
                self.recording_path.display()
            ));
        }
        Ok(())
    }

    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for LoopConfiguration {
    fn default() -> Self {
        Self {
            recording_path: std::env::temp_dir().join("voice-loop").join("recording.wav"),
            prefer_wireless_input: true,
            allow_wireless_accessories: true,
        }
    }
}
