//! Scripted stand-ins for the platform session, recorder and player, plus a
//! delegate that records every notification.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioFormatSpec, InputRoute, RouteKind};
use crate::models::capture_summary::CaptureSummary;
use crate::models::error::{AudioConfigError, ErrorKind, SessionError};
use crate::models::state::SessionState;
use crate::processing::wav_format::PcmClip;
use crate::session::events::EventSink;
use crate::storage::capture_buffer::PcmFileWriter;
use crate::traits::audio_session::AudioSessionPlatform;
use crate::traits::player::{ActivePlayback, Player};
use crate::traits::recorder::{ActiveRecording, Recorder};
use crate::traits::session_delegate::SessionDelegate;

pub fn route(id: &str, kind: RouteKind, is_default: bool) -> InputRoute {
    InputRoute {
        id: id.to_string(),
        name: format!("{} input", id),
        kind,
        is_default,
    }
}

pub fn temp_recording_path(test: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("voice_loop_session_{}", std::process::id()))
        .join(format!("{}.wav", test))
}

#[derive(Default)]
pub struct FakePlatform {
    inputs: Mutex<Vec<InputRoute>>,
    preferred: Mutex<Option<InputRoute>>,
    active: AtomicBool,
    fail_setup: AtomicBool,
    fail_apply: AtomicBool,
    apply_attempts: AtomicUsize,
    wireless_allowed: Mutex<Option<bool>>,
}

impl FakePlatform {
    pub fn with_inputs(inputs: Vec<InputRoute>) -> Arc<Self> {
        Arc::new(Self {
            inputs: Mutex::new(inputs),
            ..Default::default()
        })
    }

    pub fn fail_session_setup(&self) {
        self.fail_setup.store(true, Ordering::SeqCst);
    }

    pub fn fail_route_apply(&self) {
        self.fail_apply.store(true, Ordering::SeqCst);
    }

    pub fn preferred(&self) -> Option<InputRoute> {
        self.preferred.lock().clone()
    }

    pub fn apply_attempts(&self) -> usize {
        self.apply_attempts.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The accessory flag passed to the last `set_play_and_record` call.
    pub fn wireless_allowed(&self) -> Option<bool> {
        *self.wireless_allowed.lock()
    }
}

impl AudioSessionPlatform for FakePlatform {
    fn set_play_and_record(&self, allow_wireless_accessories: bool) -> Result<(), AudioConfigError> {
        *self.wireless_allowed.lock() = Some(allow_wireless_accessories);
        if self.fail_setup.load(Ordering::SeqCst) {
            return Err(AudioConfigError::SessionSetupFailed("category refused".into()));
        }
        Ok(())
    }

    fn activate(&self) -> Result<(), AudioConfigError> {
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn available_inputs(&self) -> Vec<InputRoute> {
        self.inputs.lock().clone()
    }

    fn current_input(&self) -> Option<InputRoute> {
        self.preferred()
            .or_else(|| self.inputs.lock().iter().find(|r| r.is_default).cloned())
    }

    fn set_preferred_input(&self, route: &InputRoute) -> Result<(), AudioConfigError> {
        self.apply_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(AudioConfigError::RouteSelectionFailed(format!("{} unavailable", route.id)));
        }
        *self.preferred.lock() = Some(route.clone());
        Ok(())
    }
}

/// What the fake recorder did and will do.
#[derive(Default)]
pub struct RecorderScript {
    /// Samples written per take, in order. Takes past the end write `[1, 2, 3]`.
    pub takes: VecDeque<Vec<i16>>,
    pub fail_start: bool,
    /// Send `recording_finished(true)` as soon as stop is requested.
    pub finish_on_stop: bool,
    pub started: usize,
    pub stops: usize,
    /// Whether an old capture file was still present when each take started.
    pub found_previous_file: Vec<bool>,
}

pub struct FakeRecorder {
    pub script: Arc<Mutex<RecorderScript>>,
}

impl FakeRecorder {
    pub fn new() -> (Self, Arc<Mutex<RecorderScript>>) {
        let script = Arc::new(Mutex::new(RecorderScript::default()));
        (
            Self {
                script: Arc::clone(&script),
            },
            script,
        )
    }
}

impl Recorder for FakeRecorder {
    fn record(
        &mut self,
        path: &Path,
        format: AudioFormatSpec,
        events: EventSink,
    ) -> Result<Box<dyn ActiveRecording>, SessionError> {
        let mut script = self.script.lock();
        if script.fail_start {
            return Err(SessionError::CaptureStart("no microphone".into()));
        }
        script.found_previous_file.push(path.exists());
        script.started += 1;

        let take = script.takes.pop_front().unwrap_or_else(|| vec![1, 2, 3]);
        let mut writer = PcmFileWriter::create(path, &format)
            .map_err(|e| SessionError::CaptureStart(e.to_string()))?;
        if !take.is_empty() {
            let bytes: Vec<u8> = take.iter().flat_map(|s| s.to_le_bytes()).collect();
            writer
                .write(&bytes)
                .map_err(|e| SessionError::CaptureStart(e.to_string()))?;
        }
        writer.close().map_err(|e| SessionError::CaptureStart(e.to_string()))?;

        Ok(Box::new(FakeRecording {
            script: Arc::clone(&self.script),
            finish_on_stop: script.finish_on_stop,
            events,
        }))
    }
}

struct FakeRecording {
    script: Arc<Mutex<RecorderScript>>,
    finish_on_stop: bool,
    events: EventSink,
}

impl ActiveRecording for FakeRecording {
    fn stop(&mut self) {
        self.script.lock().stops += 1;
        if self.finish_on_stop {
            self.events.recording_finished(true);
        }
    }
}

#[derive(Default)]
pub struct PlayerScript {
    pub fail_start: bool,
    /// Send `playback_finished(true)` as soon as playback starts.
    pub finish_immediately: bool,
    pub played: Vec<PcmClip>,
    pub stops: usize,
}

pub struct FakePlayer {
    pub script: Arc<Mutex<PlayerScript>>,
}

impl FakePlayer {
    pub fn new() -> (Self, Arc<Mutex<PlayerScript>>) {
        let script = Arc::new(Mutex::new(PlayerScript::default()));
        (
            Self {
                script: Arc::clone(&script),
            },
            script,
        )
    }
}

impl Player for FakePlayer {
    fn play(&mut self, clip: PcmClip, events: EventSink) -> Result<Box<dyn ActivePlayback>, SessionError> {
        let mut script = self.script.lock();
        if script.fail_start {
            return Err(SessionError::PlaybackStart("output device busy".into()));
        }
        script.played.push(clip);
        if script.finish_immediately {
            events.playback_finished(true);
        }
        Ok(Box::new(FakePlayback {
            script: Arc::clone(&self.script),
        }))
    }
}

struct FakePlayback {
    script: Arc<Mutex<PlayerScript>>,
}

impl ActivePlayback for FakePlayback {
    fn stop(&mut self) {
        self.script.lock().stops += 1;
    }
}

#[derive(Default)]
pub struct RecordingDelegate {
    pub states: Mutex<Vec<SessionState>>,
    pub errors: Mutex<Vec<ErrorKind>>,
    pub summaries: Mutex<Vec<CaptureSummary>>,
}

impl RecordingDelegate {
    pub fn states(&self) -> Vec<SessionState> {
        self.states.lock().clone()
    }

    pub fn errors(&self) -> Vec<ErrorKind> {
        self.errors.lock().clone()
    }
}

impl SessionDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: SessionState) {
        self.states.lock().push(state);
    }

    fn on_error(&self, error: &SessionError) {
        self.errors.lock().push(error.kind());
    }

    fn on_capture_finished(&self, summary: &CaptureSummary) {
        self.summaries.lock().push(summary.clone());
    }
}
