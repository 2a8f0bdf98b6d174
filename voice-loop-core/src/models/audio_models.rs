use serde::{Deserialize, Serialize};

/// Fixed PCM encoding used for every capture.
///
/// There is exactly one value in use, [`AudioFormatSpec::VOICE`]; the type
/// exists so that the WAV helpers and backends can derive sizes from it
/// instead of repeating magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormatSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub is_float: bool,
    pub is_big_endian: bool,
}

impl AudioFormatSpec {
    /// 44.1 kHz, mono, 16-bit signed little-endian linear PCM.
    pub const VOICE: Self = Self {
        sample_rate: 44_100,
        channels: 1,
        bit_depth: 16,
        is_float: false,
        is_big_endian: false,
    };

    /// Bytes per frame (all channels of one sample instant).
    pub const fn block_align(&self) -> u16 {
        self.channels * self.bit_depth / 8
    }

    /// Bytes per second of audio.
    pub const fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Duration in seconds of `data_bytes` of PCM in this format.
    pub fn duration_secs(&self, data_bytes: u64) -> f64 {
        data_bytes as f64 / self.byte_rate() as f64
    }
}

/// Class of hardware path behind an input route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    /// Bluetooth hands-free (HFP/HSP) headset.
    WirelessHandsFree,
    BuiltIn,
    Usb,
    Virtual,
    Other,
}

impl RouteKind {
    /// Classify a device by the name the platform reports for it.
    ///
    /// Platforms without a transport property expose the transport only
    /// through the device name, so this matches the usual markers. A name
    /// that only says "headset" is a wired headset unless it also carries a
    /// Bluetooth marker.
    pub fn from_device_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has_any = |markers: &[&str]| markers.iter().any(|marker| lower.contains(marker));

        if lower.contains("usb") {
            Self::Usb
        } else if has_any(&[
            "bluetooth",
            "bthenum",
            "bluez",
            "hands-free",
            "handsfree",
            "hfp",
            "airpods",
        ]) {
            Self::WirelessHandsFree
        } else if has_any(&["monitor", "loopback", "virtual", "null"]) {
            Self::Virtual
        } else if has_any(&["built-in", "builtin", "internal", "microphone array", "analog"]) {
            Self::BuiltIn
        } else {
            Self::Other
        }
    }
}

/// A selectable audio input path.
///
/// `id` is opaque to the core; it is handed back to the platform session
/// when the route is applied as the preferred input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputRoute {
    pub id: String,
    pub name: String,
    pub kind: RouteKind,
    pub is_default: bool,
}

impl InputRoute {
    pub fn is_wireless_hands_free(&self) -> bool {
        self.kind == RouteKind::WirelessHandsFree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_format_derived_sizes() {
        let f = AudioFormatSpec::VOICE;
        assert_eq!(f.block_align(), 2);
        assert_eq!(f.byte_rate(), 88_200);
        assert!((f.duration_secs(88_200) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn classifies_bluetooth_names_as_wireless() {
        assert_eq!(
            RouteKind::from_device_name("bluez_input.Jabra_Evolve.headset-head-unit"),
            RouteKind::WirelessHandsFree
        );
        assert_eq!(
            RouteKind::from_device_name("Headset (Plantronics BT600 Hands-Free AG Audio)"),
            RouteKind::WirelessHandsFree
        );
        assert_eq!(RouteKind::from_device_name("AirPods Pro"), RouteKind::WirelessHandsFree);
        assert_eq!(
            RouteKind::from_device_name("Jabra Bluetooth Hands-Free"),
            RouteKind::WirelessHandsFree
        );
    }

    #[test]
    fn wired_headsets_are_not_wireless() {
        assert_eq!(RouteKind::from_device_name("USB Headset"), RouteKind::Usb);
        assert_eq!(RouteKind::from_device_name("Logitech USB Headset H390"), RouteKind::Usb);
        assert_eq!(
            RouteKind::from_device_name("Headset Microphone (Realtek(R) Audio)"),
            RouteKind::Other
        );
    }

    #[test]
    fn classifies_other_names() {
        assert_eq!(RouteKind::from_device_name("USB Audio CODEC"), RouteKind::Usb);
        assert_eq!(RouteKind::from_device_name("MacBook Pro Built-in Microphone"), RouteKind::BuiltIn);
        assert_eq!(
            RouteKind::from_device_name("Monitor of Built-in Audio Analog Stereo"),
            RouteKind::Virtual
        );
        assert_eq!(RouteKind::from_device_name("default"), RouteKind::Other);
    }
}
