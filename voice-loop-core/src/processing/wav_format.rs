//! WAV container helpers for the capture file.
//!
//! Writes the standard 44-byte RIFF header up front with a zero data size,
//! patches the size fields once the recorder finishes, and decodes the
//! file back into samples (via `hound`) before playback.

use std::io::Cursor;

use crate::models::audio_models::AudioFormatSpec;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Largest whole-sample PCM payload the 32-bit RIFF size fields can describe.
pub const MAX_DATA_SIZE: u32 = (u32::MAX - 36) & !1;

const PCM_FORMAT_CODE: u16 = 1;

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate
/// [32-33]  block_align
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(format: &AudioFormatSpec, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT_CODE.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bit_depth.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Patch the RIFF chunk size (offset 4) and data size (offset 40) for a
/// payload of `data_size` bytes.
///
/// Fails instead of wrapping when the payload is larger than [`MAX_DATA_SIZE`].
pub fn patch_sizes(header: &mut [u8], data_size: u64) -> Result<(), String> {
    let data_size = u32::try_from(data_size)
        .ok()
        .filter(|&size| size <= MAX_DATA_SIZE)
        .ok_or_else(|| format!("{} bytes of PCM exceed the WAV size limit", data_size))?;
    header[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
    Ok(())
}

/// A decoded capture, ready to hand to a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub format: AudioFormatSpec,
    pub samples: Vec<i16>,
}

impl PcmClip {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / (self.format.sample_rate as f64 * self.format.channels as f64)
    }
}

/// Decode a capture file produced with `expected` format.
///
/// Extra chunks are skipped. A data size larger than the payload present
/// (recorder died before the header was patched) is clamped to the samples
/// that are there. Fails on a corrupt or mismatched header and on a payload
/// without a single sample.
pub fn decode_wav(bytes: &[u8], expected: &AudioFormatSpec) -> Result<PcmClip, String> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|e| format!("unreadable capture: {}", e))?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int
        || spec.channels != expected.channels
        || spec.sample_rate != expected.sample_rate
        || spec.bits_per_sample != expected.bit_depth
    {
        return Err(format!(
            "format mismatch: {} Hz / {} ch / {} bit {:?}",
            spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
        ));
    }

    let declared = reader.len() as usize;
    let samples: Vec<i16> = reader.into_samples::<i16>().map_while(Result::ok).collect();
    if samples.is_empty() {
        return Err("capture contains no audio".into());
    }
    if samples.len() < declared {
        log::warn!(
            "Capture header declares {} samples but only {} are present",
            declared,
            samples.len()
        );
    }

    Ok(PcmClip {
        format: *expected,
        samples,
    })
}
