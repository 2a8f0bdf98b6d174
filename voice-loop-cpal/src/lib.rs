//! # voice-loop-cpal
//!
//! Cross-platform audio backend for voice-loop, built on `cpal`.
//!
//! Provides:
//! - `CpalAudioSession` — Play-and-record session setup and input route enumeration
//! - `CpalRecorder` — Microphone capture into the fixed-format capture file
//! - `CpalPlayer` — Playback of a decoded capture on the default output device
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use voice_loop_core::{event_channel, CaptureSession, LoopConfiguration, SessionController};
//! use voice_loop_cpal::{CpalAudioSession, CpalPlayer, CpalRecorder};
//!
//! let platform = Arc::new(CpalAudioSession::new());
//! let (sink, events) = event_channel();
//! let session = CaptureSession::new(
//!     platform.clone(),
//!     Box::new(CpalRecorder::new(platform)),
//!     Box::new(CpalPlayer::new()),
//!     LoopConfiguration::default(),
//!     sink,
//! );
//! let handle = SessionController::spawn(session, events)?;
//! handle.toggle();
//! ```

pub mod audio_session;
pub mod error;
pub mod player;
pub mod recorder;

pub use audio_session::CpalAudioSession;
pub use error::BackendError;
pub use player::CpalPlayer;
pub use recorder::CpalRecorder;
