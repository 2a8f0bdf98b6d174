use crate::models::capture_summary::CaptureSummary;
use crate::models::error::SessionError;
use crate::models::state::SessionState;

/// Notifications for the shell that owns the session.
///
/// All methods are called from the session thread, not the UI thread.
/// Implementations should marshal to the UI thread if needed.
pub trait SessionDelegate: Send + Sync {
    /// Called after every state change, e.g. to relabel the toggle button.
    fn on_state_changed(&self, state: SessionState);

    /// Called for every handled failure. `error.kind()` gives the category.
    fn on_error(&self, error: &SessionError);

    /// Called when a capture has been loaded and is about to play back.
    fn on_capture_finished(&self, _summary: &CaptureSummary) {}
}
