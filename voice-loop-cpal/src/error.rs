use thiserror::Error;

/// Failures talking to the cpal host, before they are folded into the
/// session's error taxonomy.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no {0} device available")]
    NoDevice(&'static str),

    #[error("failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("no usable stream config: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio thread exited during setup")]
    ThreadExited,
}
