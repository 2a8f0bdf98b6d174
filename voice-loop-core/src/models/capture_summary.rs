use std::path::PathBuf;

use serde::Serialize;

use super::audio_models::InputRoute;

/// Facts about a finished capture, reported once its bytes are loaded
/// for playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureSummary {
    pub file_path: PathBuf,
    /// PCM payload size, excluding the container header.
    pub data_bytes: u64,
    pub duration_secs: f64,
    /// Hex SHA-256 of the whole capture file.
    pub checksum: String,
    /// RFC 3339 timestamp of when the capture was loaded.
    pub captured_at: String,
    pub input_route: Option<InputRoute>,
}
