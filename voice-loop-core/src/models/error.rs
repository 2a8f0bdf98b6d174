use thiserror::Error;

/// Failures configuring the shared audio session or applying an input route.
///
/// Always non-fatal: the loop carries on with whatever default route and
/// session state the platform left in place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioConfigError {
    #[error("audio session setup failed: {0}")]
    SessionSetupFailed(String),

    #[error("input route selection failed: {0}")]
    RouteSelectionFailed(String),
}

/// Everything that can go wrong during one record → play cycle.
///
/// None of these reach the caller of `toggle()`; each one is logged,
/// reported to the delegate and turned into a state transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    AudioConfig(#[from] AudioConfigError),

    #[error("capture could not start: {0}")]
    CaptureStart(String),

    #[error("capture did not complete: {0}")]
    CaptureCompletion(String),

    #[error("playback could not start: {0}")]
    PlaybackStart(String),

    #[error("playback did not complete: {0}")]
    PlaybackCompletion(String),
}

/// Fieldless mirror of [`SessionError`] for shells that only need the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AudioConfig,
    CaptureStart,
    CaptureCompletion,
    PlaybackStart,
    PlaybackCompletion,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AudioConfig(_) => ErrorKind::AudioConfig,
            Self::CaptureStart(_) => ErrorKind::CaptureStart,
            Self::CaptureCompletion(_) => ErrorKind::CaptureCompletion,
            Self::PlaybackStart(_) => ErrorKind::PlaybackStart,
            Self::PlaybackCompletion(_) => ErrorKind::PlaybackCompletion,
        }
    }
}
