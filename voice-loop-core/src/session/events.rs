use std::sync::mpsc;

/// Everything the capture session reacts to, in one sequential stream.
///
/// `Toggle` comes from the shell; the two completion events come from the
/// recorder and player backends on their own threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Toggle,
    RecordingFinished { success: bool },
    PlaybackFinished { success: bool },
    Shutdown,
}

/// Cloneable sending half of the session's event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<SessionEvent>,
}

impl EventSink {
    /// Queue an event. Returns false if the session is gone.
    pub fn send(&self, event: SessionEvent) -> bool {
        if self.tx.send(event).is_err() {
            log::debug!("Dropping {:?}: session event queue closed", event);
            return false;
        }
        true
    }

    pub fn toggle(&self) -> bool {
        self.send(SessionEvent::Toggle)
    }

    pub fn recording_finished(&self, success: bool) -> bool {
        self.send(SessionEvent::RecordingFinished { success })
    }

    pub fn playback_finished(&self, success: bool) -> bool {
        self.send(SessionEvent::PlaybackFinished { success })
    }
}

/// Receiving half, consumed by the session thread.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<SessionEvent>,
}

impl EventReceiver {
    /// Block until the next event. `None` once every sink is dropped.
    pub fn recv(&self) -> Option<SessionEvent> {
        self.rx.recv().ok()
    }

    /// Next queued event, if any, without blocking.
    pub fn try_recv(&self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }
}

pub fn event_channel() -> (EventSink, EventReceiver) {
    let (tx, rx) = mpsc::channel();
    (EventSink { tx }, EventReceiver { rx })
}
