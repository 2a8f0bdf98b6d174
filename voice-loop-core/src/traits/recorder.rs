use std::path::Path;

use crate::models::audio_models::AudioFormatSpec;
use crate::models::error::SessionError;
use crate::session::events::EventSink;

/// Starts captures into the capture file.
pub trait Recorder: Send {
    /// Begin recording `format` PCM into a WAV file at `path`.
    ///
    /// Must return promptly. Exactly one `recording_finished` event is sent
    /// to `events` once the returned recording stops. A recorder that cannot
    /// be created or prepared returns [`SessionError::CaptureStart`] and sends
    /// nothing.
    fn record(
        &mut self,
        path: &Path,
        format: AudioFormatSpec,
        events: EventSink,
    ) -> Result<Box<dyn ActiveRecording>, SessionError>;
}

/// A capture in flight. Dropping it without calling `stop` is a teardown;
/// no completion event is guaranteed in that case.
pub trait ActiveRecording: Send {
    /// Ask the hardware to stop. Completion arrives later as an event.
    fn stop(&mut self);
}
