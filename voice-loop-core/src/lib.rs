//! # voice-loop-core
//!
//! Platform-agnostic core of a record-then-play voice loop.
//!
//! One command (`toggle`) drives a three-state session: capture from the
//! preferred input (a wireless hands-free headset when one is present),
//! persist the take as fixed-format PCM, then play it straight back.
//! Platform backends implement the `AudioSessionPlatform`, `Recorder` and
//! `Player` traits and plug into the generic `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! voice-loop-core (this crate)
//! ├── traits/       ← AudioSessionPlatform, Recorder, Player, SessionDelegate
//! ├── models/       ← SessionState, SessionError, AudioFormatSpec, InputRoute, LoopConfiguration
//! ├── processing/   ← WAV header/decoding, PCM conversion and resampling, ring buffer
//! ├── session/      ← AudioRouteSelector, CaptureSession, SessionController, events
//! └── storage/      ← CaptureBuffer, PcmFileWriter
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioFormatSpec, InputRoute, RouteKind};
pub use models::capture_summary::CaptureSummary;
pub use models::config::LoopConfiguration;
pub use models::error::{AudioConfigError, ErrorKind, SessionError};
pub use models::state::SessionState;
pub use processing::wav_format::PcmClip;
pub use session::capture_session::CaptureSession;
pub use session::controller::{SessionController, SessionHandle};
pub use session::events::{event_channel, EventReceiver, EventSink, SessionEvent};
pub use session::route_selector::AudioRouteSelector;
pub use storage::capture_buffer::{CaptureBuffer, PcmFileWriter};
pub use traits::audio_session::AudioSessionPlatform;
pub use traits::player::{ActivePlayback, Player};
pub use traits::recorder::{ActiveRecording, Recorder};
pub use traits::session_delegate::SessionDelegate;
