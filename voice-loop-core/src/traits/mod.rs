pub mod audio_session;
pub mod player;
pub mod recorder;
pub mod session_delegate;
