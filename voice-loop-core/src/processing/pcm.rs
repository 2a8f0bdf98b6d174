//! Sample conversion between device streams and the fixed capture format.
//!
//! Pure math on `&[f32]` / `&[i16]` buffers, no platform dependencies.

/// Downmix interleaved multi-channel audio to mono by averaging channels per frame.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let scale = 1.0 / channels as f32;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Repeat each mono sample across `channels` interleaved output channels.
pub fn fan_out(mono: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return mono.to_vec();
    }
    mono.iter()
        .flat_map(|&s| std::iter::repeat(s).take(channels))
        .collect()
}

/// Linear interpolation resampling for mono audio.
///
/// Returns input unchanged if rates match.
pub fn resample(samples: &[f32], source_rate: f64, target_rate: f64) -> Vec<f32> {
    if (source_rate - target_rate).abs() < 0.01 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = target_rate / source_rate;
    let output_count = (samples.len() as f64 * ratio) as usize;
    if output_count == 0 {
        return Vec::new();
    }

    let mut output = vec![0.0f32; output_count];
    for (i, sample) in output.iter_mut().enumerate() {
        let source_index = i as f64 / ratio;
        let index = source_index as usize;
        let fraction = (source_index - index as f64) as f32;

        if index + 1 < samples.len() {
            *sample = samples[index] * (1.0 - fraction) + samples[index + 1] * fraction;
        } else if index < samples.len() {
            *sample = samples[index];
        }
    }
    output
}

/// Scale between f32 and 16-bit samples, the same one cpal uses.
const PCM16_SCALE: f32 = 32768.0;

/// Streaming linear resampler for mono audio.
///
/// Keeps the fractional source position and the last input sample between
/// calls, so feeding a signal in chunks yields the same output as feeding
/// it in one piece.
#[derive(Debug, Clone)]
pub struct Resampler {
    /// Source samples advanced per output sample.
    step: f64,
    /// Read position, relative to `previous` when it is set.
    position: f64,
    previous: Option<f32>,
}

impl Resampler {
    pub fn new(source_rate: f64, target_rate: f64) -> Self {
        Self {
            step: source_rate / target_rate,
            position: 0.0,
            previous: None,
        }
    }

    fn is_passthrough(&self) -> bool {
        (self.step - 1.0).abs() < 1e-6
    }

    /// Resample the next chunk of a continuous signal.
    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        if self.is_passthrough() || samples.is_empty() {
            return samples.to_vec();
        }

        // Index 0 is the carried-over sample when there is one.
        let previous = self.previous;
        let offset = usize::from(previous.is_some());
        let len = samples.len() + offset;
        let at = |i: usize| match (i, previous) {
            (0, Some(previous)) => previous,
            _ => samples[i - offset],
        };

        let mut output = Vec::with_capacity((samples.len() as f64 / self.step) as usize + 1);
        while self.position + 1.0 < len as f64 {
            let index = self.position as usize;
            let fraction = (self.position - index as f64) as f32;
            output.push(at(index) * (1.0 - fraction) + at(index + 1) * fraction);
            self.position += self.step;
        }

        self.position -= (len - 1) as f64;
        self.previous = samples.last().copied();
        output
    }
}

/// Convert f32 samples `[-1.0, 1.0]` to 16-bit little-endian PCM bytes.
///
/// Clamps out-of-range values. Output length = `samples.len() * 2` bytes.
pub fn to_pcm16_le(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * PCM16_SCALE).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Convert 16-bit samples to f32 in `[-1.0, 1.0)`.
pub fn pcm16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / PCM16_SCALE).collect()
}
