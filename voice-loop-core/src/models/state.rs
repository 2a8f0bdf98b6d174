use serde::Serialize;

/// Externally observed state of the voice loop.
///
/// ```text
/// Idle ──toggle──▶ Recording ──recording finished (ok)──▶ Playing
///  ▲                  │                                     │
///  └──── failure ─────┘◀──────── playback finished ─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Playing,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        }
    }

    /// Text for the shell's single toggle button.
    pub fn button_label(&self) -> &'static str {
        match self {
            Self::Recording => "Stop Listening",
            Self::Idle | Self::Playing => "Start Listening",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
