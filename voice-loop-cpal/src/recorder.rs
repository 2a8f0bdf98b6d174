//! Microphone capture into the capture file.
//!
//! The cpal stream lives on a dedicated capture thread for its whole life
//! (streams are not `Send` on every host). The audio callback only converts
//! device samples to f32 and pushes them into a ring buffer. The capture
//! thread drains that buffer every 10 ms, downmixes to mono, resamples to
//! the capture rate and streams 16-bit PCM into the WAV writer.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::Sample;
use parking_lot::Mutex;

use voice_loop_core::models::audio_models::AudioFormatSpec;
use voice_loop_core::models::error::SessionError;
use voice_loop_core::processing::pcm::{self, Resampler};
use voice_loop_core::processing::ring_buffer::RingBuffer;
use voice_loop_core::session::events::EventSink;
use voice_loop_core::storage::capture_buffer::PcmFileWriter;
use voice_loop_core::traits::recorder::{ActiveRecording, Recorder};

use crate::audio_session::CpalAudioSession;
use crate::error::BackendError;

/// Seconds of device audio the ring buffer holds before dropping the oldest.
const RING_SECONDS: usize = 2;

/// Records from the session's preferred input.
pub struct CpalRecorder {
    session: Arc<CpalAudioSession>,
}

impl CpalRecorder {
    pub fn new(session: Arc<CpalAudioSession>) -> Self {
        Self { session }
    }
}

impl Recorder for CpalRecorder {
    fn record(
        &mut self,
        path: &Path,
        format: AudioFormatSpec,
        events: EventSink,
    ) -> Result<Box<dyn ActiveRecording>, SessionError> {
        let writer = PcmFileWriter::create(path, &format)
            .map_err(|e| SessionError::CaptureStart(format!("failed to create {}: {}", path.display(), e)))?;

        let device = match self.session.input_device() {
            Ok(device) => device,
            Err(e) => {
                fs::remove_file(path).ok();
                return Err(SessionError::CaptureStart(e.to_string()));
            }
        };

        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::channel();
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("voice-loop-capture".into())
            .spawn(move || capture_loop(device, format, writer, thread_running, ready_tx, events))
            .map_err(|e| {
                fs::remove_file(path).ok();
                SessionError::CaptureStart(format!("failed to spawn capture thread: {}", e))
            })?;

        match ready_rx.recv().unwrap_or(Err(BackendError::ThreadExited)) {
            Ok(name) => {
                log::info!("Recording from {}", name);
                Ok(Box::new(CpalRecording {
                    running,
                    handle: Some(handle),
                }))
            }
            Err(e) => {
                let _ = handle.join();
                fs::remove_file(path).ok();
                Err(SessionError::CaptureStart(e.to_string()))
            }
        }
    }
}

/// A running capture. `stop` only signals the capture thread; the
/// completion event follows once the file is finalized.
pub struct CpalRecording {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ActiveRecording for CpalRecording {
    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for CpalRecording {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// State shared between the capture thread and the audio callback.
struct CaptureShared {
    ring: Mutex<RingBuffer>,
    failed: AtomicBool,
}

/// Capture-thread side: turns drained device samples into capture PCM.
struct CapturePipeline {
    writer: PcmFileWriter,
    resampler: Resampler,
    channels: usize,
    pending: Vec<f32>,
}

impl CapturePipeline {
    fn new(writer: PcmFileWriter, channels: usize, source_rate: f64, target_rate: f64) -> Self {
        Self {
            writer,
            resampler: Resampler::new(source_rate, target_rate),
            channels,
            pending: Vec::new(),
        }
    }

    /// Write everything waiting in `ring` to the capture file.
    fn drain(&mut self, ring: &Mutex<RingBuffer>) -> io::Result<()> {
        {
            let mut ring = ring.lock();
            let dropped = ring.take_dropped();
            if dropped > 0 {
                log::warn!("Capture fell behind; dropped {} samples", dropped);
            }
            ring.drain_into(&mut self.pending);
        }

        // Keep a partial frame for the next drain.
        let whole = self.pending.len() - self.pending.len() % self.channels.max(1);
        if whole == 0 {
            return Ok(());
        }
        let mono = pcm::downmix_to_mono(&self.pending[..whole], self.channels);
        self.pending.drain(..whole);
        let resampled = self.resampler.process(&mono);
        self.writer.write(&pcm::to_pcm16_le(&resampled))
    }
}

/// Runs on the capture thread until `running` is cleared, the stream fails
/// or the capture file is full.
fn capture_loop(
    device: cpal::Device,
    format: AudioFormatSpec,
    writer: PcmFileWriter,
    running: Arc<AtomicBool>,
    ready: mpsc::Sender<Result<String, BackendError>>,
    events: EventSink,
) {
    let name = device.name().unwrap_or_else(|_| "input device".into());
    let supported = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => {
            let _ = ready.send(Err(e.into()));
            return;
        }
    };
    log::debug!(
        "Input format: {} Hz, {} ch, {:?}",
        supported.sample_rate().0,
        supported.channels(),
        supported.sample_format()
    );

    let channels = supported.channels() as usize;
    let source_rate = supported.sample_rate().0;
    let shared = Arc::new(CaptureShared {
        ring: Mutex::new(RingBuffer::new(source_rate as usize * channels * RING_SECONDS)),
        failed: AtomicBool::new(false),
    });
    let mut pipeline = CapturePipeline::new(writer, channels, source_rate as f64, format.sample_rate as f64);

    let config = supported.config();
    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_input::<f32>(&device, &config, &shared),
        cpal::SampleFormat::F64 => build_input::<f64>(&device, &config, &shared),
        cpal::SampleFormat::I8 => build_input::<i8>(&device, &config, &shared),
        cpal::SampleFormat::I16 => build_input::<i16>(&device, &config, &shared),
        cpal::SampleFormat::I32 => build_input::<i32>(&device, &config, &shared),
        cpal::SampleFormat::U8 => build_input::<u8>(&device, &config, &shared),
        cpal::SampleFormat::U16 => build_input::<u16>(&device, &config, &shared),
        other => Err(BackendError::UnsupportedFormat(other)),
    };
    let stream = match stream.and_then(|s| s.play().map(|_| s).map_err(BackendError::from)) {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("Input stream on {} failed to start: {}", name, e);
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(name));

    let mut write_failed = false;
    while running.load(Ordering::SeqCst) && !shared.failed.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(10));
        if let Err(e) = pipeline.drain(&shared.ring) {
            log::error!("Failed to write audio data: {}", e);
            write_failed = true;
            break;
        }
        if pipeline.writer.is_full() {
            log::warn!("Capture file reached the WAV size limit; stopping");
            break;
        }
    }
    drop(stream);

    if !write_failed {
        if let Err(e) = pipeline.drain(&shared.ring) {
            log::error!("Failed to write audio data: {}", e);
            write_failed = true;
        }
    }

    let success = match pipeline.writer.close() {
        Ok(data_bytes) => {
            log::info!("Captured {} bytes of PCM", data_bytes);
            !write_failed && !shared.failed.load(Ordering::SeqCst)
        }
        Err(e) => {
            log::error!("Failed to finalize capture file: {}", e);
            false
        }
    };
    events.recording_finished(success);
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: &Arc<CaptureShared>,
) -> Result<cpal::Stream, BackendError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let data_shared = Arc::clone(shared);
    let error_shared = Arc::clone(shared);
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            data_shared.ring.lock().extend(data.iter().map(|&s| f32::from_sample(s)));
        },
        move |e| {
            log::error!("Input stream error: {}", e);
            error_shared.failed.store(true, Ordering::SeqCst);
        },
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("voice_loop_cpal_{}", std::process::id()))
            .join(name)
    }

    fn pcm_payload(path: &Path) -> Vec<i16> {
        fs::read(path).unwrap()[44..]
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn pipeline_downmixes_stereo_into_capture_pcm() {
        let path = temp_file_path("stereo.wav");
        let writer = PcmFileWriter::create(&path, &AudioFormatSpec::VOICE).unwrap();
        let mut pipeline = CapturePipeline::new(writer, 2, 44_100.0, 44_100.0);
        let ring = Mutex::new(RingBuffer::new(16));

        ring.lock().extend([0.5, 0.0, 0.25, 0.25, -0.5]);
        pipeline.drain(&ring).unwrap();
        // The lone left sample waits for its right channel.
        ring.lock().extend([-0.5]);
        pipeline.drain(&ring).unwrap();
        assert_eq!(pipeline.writer.close().unwrap(), 6);

        assert_eq!(pcm_payload(&path), vec![8192, 8192, -16384]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn pipeline_resamples_across_drains() {
        let path = temp_file_path("resampled.wav");
        let writer = PcmFileWriter::create(&path, &AudioFormatSpec::VOICE).unwrap();
        let mut pipeline = CapturePipeline::new(writer, 1, 48_000.0, 44_100.0);
        let ring = Mutex::new(RingBuffer::new(4800));

        for _ in 0..10 {
            ring.lock().extend(std::iter::repeat(0.0).take(480));
            pipeline.drain(&ring).unwrap();
        }
        let data_bytes = pipeline.writer.close().unwrap();

        // 100 ms at 48 kHz is 4410 samples at 44.1 kHz.
        assert_eq!(data_bytes, 4410 * 2);
        fs::remove_file(&path).ok();
    }
}
