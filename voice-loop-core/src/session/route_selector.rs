use std::sync::Arc;

use crate::models::audio_models::InputRoute;
use crate::models::error::AudioConfigError;
use crate::traits::audio_session::AudioSessionPlatform;

/// Input routing policy: prefer a wireless hands-free headset, else whatever
/// the platform defaults to.
///
/// Holds no state of its own; every call queries the platform afresh.
pub struct AudioRouteSelector {
    platform: Arc<dyn AudioSessionPlatform>,
    allow_wireless_accessories: bool,
}

impl AudioRouteSelector {
    pub fn new(platform: Arc<dyn AudioSessionPlatform>, allow_wireless_accessories: bool) -> Self {
        Self {
            platform,
            allow_wireless_accessories,
        }
    }

    /// Put the shared session in play-and-record mode and activate it.
    ///
    /// Calling this while the session is already active is a no-op.
    pub fn configure(&self) -> Result<(), AudioConfigError> {
        log::debug!(
            "Configuring play-and-record session (wireless accessories: {})",
            self.allow_wireless_accessories
        );
        self.platform.set_play_and_record(self.allow_wireless_accessories)?;
        self.platform.activate()
    }

    /// Apply the first wireless hands-free input as preferred and return it,
    /// else return the platform's current default route.
    ///
    /// Returns `None` when the platform reports no inputs at all. Failing to
    /// apply a matched route is logged and falls back to the default.
    pub fn select_preferred_input(&self) -> Option<InputRoute> {
        let routes = self.platform.available_inputs();
        if routes.is_empty() {
            log::warn!("No input audio routes found");
            return None;
        }

        if let Some(route) = routes.iter().find(|r| r.is_wireless_hands_free()) {
            log::info!("Setting input route to: {} ({})", route.name, route.id);
            match self.platform.set_preferred_input(route) {
                Ok(()) => return Some(route.clone()),
                Err(e) => log::warn!("{}; continuing with default route", e),
            }
        }

        self.default_route(&routes)
    }

    /// The route the platform records from without any preference applied.
    pub fn default_input(&self) -> Option<InputRoute> {
        self.default_route(&self.platform.available_inputs())
    }

    fn default_route(&self, routes: &[InputRoute]) -> Option<InputRoute> {
        self.platform
            .current_input()
            .or_else(|| routes.iter().find(|r| r.is_default).cloned())
    }
}
