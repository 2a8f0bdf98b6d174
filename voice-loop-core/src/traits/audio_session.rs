use crate::models::audio_models::InputRoute;
use crate::models::error::AudioConfigError;

/// The platform's shared audio session, reduced to what the voice loop needs.
///
/// Injected into the route selector so nothing in the core touches global
/// platform state directly. Implemented by:
/// - `CpalAudioSession` (voice-loop-cpal)
/// - scripted fakes in tests
pub trait AudioSessionPlatform: Send + Sync {
    /// Request simultaneous record + playback capability, optionally letting
    /// wireless accessories carry input and output.
    fn set_play_and_record(&self, allow_wireless_accessories: bool) -> Result<(), AudioConfigError>;

    /// Activate the session (enables hardware I/O). Activating an already
    /// active session must succeed.
    fn activate(&self) -> Result<(), AudioConfigError>;

    /// Input routes currently available, in platform order.
    fn available_inputs(&self) -> Vec<InputRoute>;

    /// The route the platform would record from right now.
    fn current_input(&self) -> Option<InputRoute>;

    /// Make `route` the preferred input for subsequent recordings.
    fn set_preferred_input(&self, route: &InputRoute) -> Result<(), AudioConfigError>;
}
