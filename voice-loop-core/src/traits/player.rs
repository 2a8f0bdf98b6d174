use crate::models::error::SessionError;
use crate::processing::wav_format::PcmClip;
use crate::session::events::EventSink;

/// Renders decoded captures through the output device.
pub trait Player: Send {
    /// Start playing `clip`. Exactly one `playback_finished` event is sent
    /// to `events` when it runs to completion or fails mid-way.
    fn play(&mut self, clip: PcmClip, events: EventSink) -> Result<Box<dyn ActivePlayback>, SessionError>;
}

/// Playback in flight.
pub trait ActivePlayback: Send {
    /// Stop output and release the device. No completion event follows.
    fn stop(&mut self);
}
