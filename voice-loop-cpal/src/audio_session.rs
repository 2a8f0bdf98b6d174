//! Play-and-record session and input routing on top of cpal.
//!
//! cpal has no process-wide session object and no stable device IDs, so
//! this keeps the session flags itself and identifies devices by name.
//! Transport is inferred from the name (Bluetooth/HFP markers), the same
//! way the device enumerator of a platform without transport properties
//! has to.

use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait};
use parking_lot::Mutex;

use voice_loop_core::models::audio_models::{InputRoute, RouteKind};
use voice_loop_core::models::error::AudioConfigError;
use voice_loop_core::traits::audio_session::AudioSessionPlatform;

use crate::error::BackendError;

/// The shared audio session for this process.
pub struct CpalAudioSession {
    play_and_record: AtomicBool,
    allow_wireless_accessories: AtomicBool,
    active: AtomicBool,
    preferred_input: Mutex<Option<String>>,
}

impl CpalAudioSession {
    pub fn new() -> Self {
        Self {
            play_and_record: AtomicBool::new(false),
            allow_wireless_accessories: AtomicBool::new(true),
            active: AtomicBool::new(false),
            preferred_input: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Name of the input device recordings should open, if one was applied.
    pub fn preferred_input_name(&self) -> Option<String> {
        self.preferred_input.lock().clone()
    }

    /// Open the preferred input device, falling back to the host default.
    pub(crate) fn input_device(&self) -> Result<cpal::Device, BackendError> {
        let host = cpal::default_host();
        if let Some(name) = self.preferred_input_name() {
            match find_input_device(&host, &name) {
                Some(device) => return Ok(device),
                None => log::warn!("Preferred input {} disappeared; using default input", name),
            }
        }
        host.default_input_device().ok_or(BackendError::NoDevice("input"))
    }

    fn list_routes(&self) -> Result<Vec<InputRoute>, BackendError> {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host.input_devices()?;

        let mut routes = Vec::new();
        for (i, device) in devices.enumerate() {
            let name = device.name().unwrap_or_else(|_| format!("Input {}", i));
            routes.push(route_for(&name, default_name.as_deref() == Some(name.as_str())));
        }
        Ok(routes)
    }
}

impl Default for CpalAudioSession {
    fn default() -> Self {
        Self::new()
    }
}

fn route_for(name: &str, is_default: bool) -> InputRoute {
    InputRoute {
        id: name.to_string(),
        name: name.to_string(),
        kind: RouteKind::from_device_name(name),
        is_default,
    }
}

fn find_input_device(host: &cpal::Host, name: &str) -> Option<cpal::Device> {
    host.input_devices()
        .ok()?
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
}

impl AudioSessionPlatform for CpalAudioSession {
    fn set_play_and_record(&self, allow_wireless_accessories: bool) -> Result<(), AudioConfigError> {
        let host = cpal::default_host();
        if host.default_input_device().is_none() {
            return Err(AudioConfigError::SessionSetupFailed(BackendError::NoDevice("input").to_string()));
        }
        if host.default_output_device().is_none() {
            return Err(AudioConfigError::SessionSetupFailed(BackendError::NoDevice("output").to_string()));
        }
        self.allow_wireless_accessories
            .store(allow_wireless_accessories, Ordering::SeqCst);
        if !allow_wireless_accessories {
            let mut preferred = self.preferred_input.lock();
            if preferred
                .as_deref()
                .is_some_and(|name| RouteKind::from_device_name(name) == RouteKind::WirelessHandsFree)
            {
                *preferred = None;
            }
        }
        self.play_and_record.store(true, Ordering::SeqCst);
        log::debug!("Session category set to play-and-record");
        Ok(())
    }

    fn activate(&self) -> Result<(), AudioConfigError> {
        if self.active.load(Ordering::SeqCst) {
            return Ok(());
        }
        if !self.play_and_record.load(Ordering::SeqCst) {
            return Err(AudioConfigError::SessionSetupFailed(
                "session category not set to play-and-record".into(),
            ));
        }
        self.active.store(true, Ordering::SeqCst);
        log::info!("Audio session active");
        Ok(())
    }

    fn available_inputs(&self) -> Vec<InputRoute> {
        self.list_routes().unwrap_or_else(|e| {
            log::warn!("Listing input routes: {}", e);
            Vec::new()
        })
    }

    fn current_input(&self) -> Option<InputRoute> {
        let device = self.input_device().ok()?;
        let name = device.name().ok()?;
        let default_name = cpal::default_host()
            .default_input_device()
            .and_then(|d| d.name().ok());
        Some(route_for(&name, default_name.as_deref() == Some(name.as_str())))
    }

    fn set_preferred_input(&self, route: &InputRoute) -> Result<(), AudioConfigError> {
        if route.is_wireless_hands_free() && !self.allow_wireless_accessories.load(Ordering::SeqCst) {
            return Err(AudioConfigError::RouteSelectionFailed(format!(
                "wireless accessories are not allowed: {}",
                route.name
            )));
        }
        if find_input_device(&cpal::default_host(), &route.id).is_none() {
            return Err(AudioConfigError::RouteSelectionFailed(format!(
                "input device not found: {}",
                route.id
            )));
        }
        *self.preferred_input.lock() = Some(route.id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_carry_name_as_handle() {
        let route = route_for("Jabra Evolve 65 Hands-Free", false);
        assert_eq!(route.id, route.name);
        assert_eq!(route.kind, RouteKind::WirelessHandsFree);
        assert!(!route.is_default);
    }

    #[test]
    fn activation_requires_play_and_record() {
        let session = CpalAudioSession::new();
        assert!(matches!(
            session.activate(),
            Err(AudioConfigError::SessionSetupFailed(_))
        ));
        assert!(!session.is_active());
    }

    #[test]
    fn wireless_route_rejected_when_accessories_disallowed() {
        let session = CpalAudioSession::new();
        session.allow_wireless_accessories.store(false, Ordering::SeqCst);
        let err = session
            .set_preferred_input(&route_for("BT Headset", false))
            .unwrap_err();
        assert!(matches!(err, AudioConfigError::RouteSelectionFailed(_)));
        assert_eq!(session.preferred_input_name(), None);
    }
}
