use std::sync::Arc;

use crate::models::audio_models::{AudioFormatSpec, InputRoute};
use crate::models::capture_summary::CaptureSummary;
use crate::models::config::LoopConfiguration;
use crate::models::error::SessionError;
use crate::models::state::SessionState;
use crate::processing::wav_format;
use crate::session::events::{EventSink, SessionEvent};
use crate::session::route_selector::AudioRouteSelector;
use crate::storage::capture_buffer::{self, CaptureBuffer};
use crate::traits::audio_session::AudioSessionPlatform;
use crate::traits::player::{ActivePlayback, Player};
use crate::traits::recorder::{ActiveRecording, Recorder};
use crate::traits::session_delegate::SessionDelegate;

/// Internal phase. The active recorder or player lives inside the phase
/// that needs it, so neither can exist in the wrong state.
enum Phase {
    Idle,
    Recording {
        recording: Box<dyn ActiveRecording>,
        stop_requested: bool,
    },
    Playing {
        playback: Box<dyn ActivePlayback>,
    },
}

impl Phase {
    fn state(&self) -> SessionState {
        match self {
            Self::Idle => SessionState::Idle,
            Self::Recording { .. } => SessionState::Recording,
            Self::Playing { .. } => SessionState::Playing,
        }
    }
}

/// Record → stop → decode → play state machine.
///
/// ```text
/// Idle      ─toggle─────────────────▶ Recording   (configure route, discard old take, start capture)
/// Recording ─toggle─────────────────▶ Recording   (stop requested, completion pending)
/// Recording ─recording finished ok──▶ Playing     (load + decode take, start playback)
/// Recording ─recording failed───────▶ Idle        (take discarded)
/// Playing   ─toggle─────────────────▶ Playing     (ignored)
/// Playing   ─playback finished──────▶ Idle        (player released)
/// ```
///
/// Every event goes through [`handle_event`](Self::handle_event), one at a
/// time. Failures never escape: each is logged, reported to the delegate and
/// turned into a transition. Nothing is retried; the next toggle from `Idle`
/// is a fresh attempt.
pub struct CaptureSession {
    selector: AudioRouteSelector,
    recorder: Box<dyn Recorder>,
    player: Box<dyn Player>,
    config: LoopConfiguration,
    buffer: CaptureBuffer,
    events: EventSink,
    phase: Phase,
    input_route: Option<InputRoute>,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl CaptureSession {
    /// `events` must feed the receiver that drives this session; it is
    /// handed to the backends for their completion events.
    pub fn new(
        platform: Arc<dyn AudioSessionPlatform>,
        recorder: Box<dyn Recorder>,
        player: Box<dyn Player>,
        config: LoopConfiguration,
        events: EventSink,
    ) -> Self {
        let selector = AudioRouteSelector::new(platform, config.allow_wireless_accessories);
        let buffer = CaptureBuffer::new(config.recording_path.clone());
        Self {
            selector,
            recorder,
            player,
            config,
            buffer,
            events,
            phase: Phase::Idle,
            input_route: None,
            delegate: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> SessionState {
        self.phase.state()
    }

    /// A sender into this session's event queue.
    pub fn events(&self) -> EventSink {
        self.events.clone()
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    /// Route chosen for the current (or most recent) capture.
    pub fn input_route(&self) -> Option<&InputRoute> {
        self.input_route.as_ref()
    }

    /// The single transition function.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Toggle => self.toggle(),
            SessionEvent::RecordingFinished { success } => self.recording_finished(success),
            SessionEvent::PlaybackFinished { success } => self.playback_finished(success),
            SessionEvent::Shutdown => self.shutdown(),
        }
    }

    /// The only shell command. Its effect depends entirely on the current state.
    pub fn toggle(&mut self) {
        match &mut self.phase {
            Phase::Idle => self.start_recording(),
            Phase::Recording {
                recording,
                stop_requested,
            } => {
                if *stop_requested {
                    log::debug!("Stop already requested; waiting for recorder to finish");
                    return;
                }
                log::info!("Stopping recording");
                recording.stop();
                *stop_requested = true;
            }
            Phase::Playing { .. } => {
                log::info!("Toggle ignored while playing back");
            }
        }
    }

    /// Stop whatever is active and return to `Idle`. Used when the owning
    /// shell goes away.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => return,
            Phase::Recording { mut recording, .. } => {
                log::info!("Shutting down: stopping recorder");
                recording.stop();
            }
            Phase::Playing { mut playback } => {
                log::info!("Shutting down: stopping playback");
                playback.stop();
            }
        }
        self.notify_state();
    }

    fn start_recording(&mut self) {
        if let Err(e) = self.selector.configure() {
            log::warn!("{}; continuing with current session configuration", e);
            self.report(e.into());
        }

        self.input_route = if self.config.prefer_wireless_input {
            self.selector.select_preferred_input()
        } else {
            self.selector.default_input()
        };

        if let Err(e) = self.buffer.discard() {
            log::warn!(
                "Failed to remove previous capture {}: {}",
                self.buffer.path().display(),
                e
            );
        }

        log::info!(
            "Starting recording to {} via {}",
            self.buffer.path().display(),
            self.input_route
                .as_ref()
                .map(|r| r.name.as_str())
                .unwrap_or("default input")
        );

        match self
            .recorder
            .record(self.buffer.path(), AudioFormatSpec::VOICE, self.events.clone())
        {
            Ok(recording) => {
                self.phase = Phase::Recording {
                    recording,
                    stop_requested: false,
                };
                self.notify_state();
            }
            Err(e) => {
                log::error!("Error creating audio recorder: {}", e);
                self.report(e);
            }
        }
    }

    fn recording_finished(&mut self, success: bool) {
        if !matches!(self.phase, Phase::Recording { .. }) {
            log::warn!("Ignoring recording-finished event in {} state", self.state());
            return;
        }
        // Releases the recorder.
        self.phase = Phase::Idle;
        log::info!("Recording finished (successfully: {})", success);

        if !success {
            if let Err(e) = self.buffer.discard() {
                log::warn!("Failed to discard failed capture: {}", e);
            }
            self.fail(SessionError::CaptureCompletion(
                "recorder reported an unsuccessful recording".into(),
            ));
            return;
        }

        let clip = match self.load_capture() {
            Ok(clip) => clip,
            Err(e) => return self.fail(e),
        };

        // Playback can only be entered from Recording, so no earlier player
        // is alive at this point.
        match self.player.play(clip, self.events.clone()) {
            Ok(playback) => {
                self.phase = Phase::Playing { playback };
                self.notify_state();
            }
            Err(e) => self.fail(e),
        }
    }

    fn playback_finished(&mut self, success: bool) {
        if !matches!(self.phase, Phase::Playing { .. }) {
            log::warn!("Ignoring playback-finished event in {} state", self.state());
            return;
        }
        // Releases the player.
        self.phase = Phase::Idle;
        log::info!("Playback finished (successfully: {})", success);

        if !success {
            self.report(SessionError::PlaybackCompletion(
                "player reported an unsuccessful or interrupted playback".into(),
            ));
        }
        self.notify_state();
    }

    /// Read the finished take, decode it and report its summary.
    fn load_capture(&self) -> Result<wav_format::PcmClip, SessionError> {
        let bytes = self.buffer.load().map_err(|e| {
            SessionError::PlaybackStart(format!(
                "failed to read {}: {}",
                self.buffer.path().display(),
                e
            ))
        })?;
        log::info!("Loaded capture ({} bytes)", bytes.len());

        let clip = wav_format::decode_wav(&bytes, &AudioFormatSpec::VOICE)
            .map_err(SessionError::PlaybackStart)?;

        let data_bytes = clip.samples.len() as u64 * 2;
        let summary = CaptureSummary {
            file_path: self.buffer.path().to_path_buf(),
            data_bytes,
            duration_secs: AudioFormatSpec::VOICE.duration_secs(data_bytes),
            checksum: capture_buffer::sha256_hex(&bytes),
            captured_at: chrono::Utc::now().to_rfc3339(),
            input_route: self.input_route.clone(),
        };
        if let Some(ref delegate) = self.delegate {
            delegate.on_capture_finished(&summary);
        }
        Ok(clip)
    }

    /// Report `error` and land in `Idle`.
    fn fail(&mut self, error: SessionError) {
        log::error!("{}", error);
        self.phase = Phase::Idle;
        self.report(error);
        self.notify_state();
    }

    fn report(&self, error: SessionError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
    }

    fn notify_state(&self) {
        let state = self.state();
        log::info!("Session state: {}", state);
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }
}
