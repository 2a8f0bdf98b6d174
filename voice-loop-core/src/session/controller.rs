use std::io;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::state::SessionState;
use crate::session::capture_session::CaptureSession;
use crate::session::events::{EventReceiver, EventSink, SessionEvent};

/// Runs a [`CaptureSession`] on its own thread, feeding it events one at a
/// time so no two transitions ever overlap.
pub struct SessionController;

impl SessionController {
    /// Move `session` onto a dedicated thread driven by `events`.
    ///
    /// `events` must be the receiver paired with the sink the session was
    /// built with.
    pub fn spawn(session: CaptureSession, events: EventReceiver) -> io::Result<SessionHandle> {
        let sink = session.events();
        let state = Arc::new(Mutex::new(session.state()));
        let shared = Arc::clone(&state);

        let thread = thread::Builder::new()
            .name("voice-loop-session".into())
            .spawn(move || run(session, events, shared))?;

        Ok(SessionHandle {
            sink,
            state,
            thread: Some(thread),
        })
    }
}

fn run(mut session: CaptureSession, events: EventReceiver, state: Arc<Mutex<SessionState>>) {
    while let Some(event) = events.recv() {
        log::debug!("Handling {:?} in {} state", event, session.state());
        if event == SessionEvent::Shutdown {
            break;
        }
        session.handle_event(event);
        *state.lock() = session.state();
    }
    session.shutdown();
    *state.lock() = session.state();
    log::debug!("Session thread exiting");
}

/// Shell-side handle to a running session.
///
/// Dropping the handle shuts the session down and joins its thread.
pub struct SessionHandle {
    sink: EventSink,
    state: Arc<Mutex<SessionState>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SessionHandle {
    /// Queue a toggle. Returns immediately; the outcome arrives through
    /// the delegate.
    pub fn toggle(&self) {
        self.sink.toggle();
    }

    /// State after the most recently handled event.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Stop any active recording or playback and join the session thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.sink.send(SessionEvent::Shutdown);
        if thread.join().is_err() {
            log::error!("Session thread panicked");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::models::audio_models::RouteKind;
    use crate::models::config::LoopConfiguration;
    use crate::session::events::event_channel;
    use crate::testing::{route, temp_recording_path, FakePlatform, FakePlayer, FakeRecorder, RecordingDelegate};
    use crate::traits::audio_session::AudioSessionPlatform;
    use crate::traits::session_delegate::SessionDelegate;

    fn wait_for(handle: &SessionHandle, state: SessionState) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if handle.state() == state {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn round_trip_on_session_thread() {
        let platform = FakePlatform::with_inputs(vec![route("mic", RouteKind::BuiltIn, true)]);
        let (recorder, recorder_script) = FakeRecorder::new();
        recorder_script.lock().finish_on_stop = true;
        let (player, player_script) = FakePlayer::new();
        player_script.lock().finish_immediately = true;

        let (sink, events) = event_channel();
        let mut session = CaptureSession::new(
            platform as Arc<dyn AudioSessionPlatform>,
            Box::new(recorder),
            Box::new(player),
            LoopConfiguration {
                recording_path: temp_recording_path("controller_round_trip"),
                ..Default::default()
            },
            sink,
        );
        let delegate = Arc::new(RecordingDelegate::default());
        session.set_delegate(Arc::clone(&delegate) as Arc<dyn SessionDelegate>);

        let handle = SessionController::spawn(session, events).unwrap();
        handle.toggle();
        assert!(wait_for(&handle, SessionState::Recording));

        handle.toggle();
        assert!(wait_for(&handle, SessionState::Idle));

        assert_eq!(
            delegate.states(),
            vec![SessionState::Recording, SessionState::Playing, SessionState::Idle]
        );
        assert_eq!(player_script.lock().played.len(), 1);
        handle.shutdown();
    }

    #[test]
    fn dropping_handle_stops_active_recording() {
        let platform = FakePlatform::with_inputs(Vec::new());
        let (recorder, recorder_script) = FakeRecorder::new();
        let (player, _) = FakePlayer::new();
        let (sink, events) = event_channel();
        let session = CaptureSession::new(
            platform as Arc<dyn AudioSessionPlatform>,
            Box::new(recorder),
            Box::new(player),
            LoopConfiguration {
                recording_path: temp_recording_path("controller_drop"),
                ..Default::default()
            },
            sink,
        );

        let handle = SessionController::spawn(session, events).unwrap();
        handle.toggle();
        assert!(wait_for(&handle, SessionState::Recording));
        drop(handle);

        assert_eq!(recorder_script.lock().stops, 1);
    }
}
