//! Playback of a decoded capture on the default output device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;

use voice_loop_core::models::error::SessionError;
use voice_loop_core::processing::pcm;
use voice_loop_core::processing::wav_format::PcmClip;
use voice_loop_core::session::events::EventSink;
use voice_loop_core::traits::player::{ActivePlayback, Player};

use crate::error::BackendError;

/// Plays captures at full volume on the host's default output device.
#[derive(Debug, Default)]
pub struct CpalPlayer;

impl CpalPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Player for CpalPlayer {
    fn play(&mut self, clip: PcmClip, events: EventSink) -> Result<Box<dyn ActivePlayback>, SessionError> {
        log::info!("Playing {:.2}s capture", clip.duration_secs());

        let stopped = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel();
        let thread_stopped = Arc::clone(&stopped);

        let handle = thread::Builder::new()
            .name("voice-loop-playback".into())
            .spawn(move || playback_loop(clip, thread_stopped, ready_tx, events))
            .map_err(|e| SessionError::PlaybackStart(format!("failed to spawn playback thread: {}", e)))?;

        match ready_rx.recv().unwrap_or(Err(BackendError::ThreadExited)) {
            Ok(name) => {
                log::info!("Playing on {}", name);
                Ok(Box::new(CpalPlayback {
                    stopped,
                    handle: Some(handle),
                }))
            }
            Err(e) => {
                let _ = handle.join();
                Err(SessionError::PlaybackStart(e.to_string()))
            }
        }
    }
}

/// Playback in flight. Stopping releases the stream and joins the thread.
pub struct CpalPlayback {
    stopped: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CpalPlayback {
    fn release(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl ActivePlayback for CpalPlayback {
    fn stop(&mut self) {
        self.release();
    }
}

impl Drop for CpalPlayback {
    fn drop(&mut self) {
        self.release();
    }
}

/// Device-ready interleaved samples and the render position within them.
struct PlaybackCursor {
    samples: Vec<f32>,
    position: AtomicUsize,
    failed: AtomicBool,
}

impl PlaybackCursor {
    fn is_drained(&self) -> bool {
        self.position.load(Ordering::Relaxed) >= self.samples.len()
    }
}

fn playback_loop(
    clip: PcmClip,
    stopped: Arc<AtomicBool>,
    ready: mpsc::Sender<Result<String, BackendError>>,
    events: EventSink,
) {
    let Some(device) = cpal::default_host().default_output_device() else {
        let _ = ready.send(Err(BackendError::NoDevice("output")));
        return;
    };
    let name = device.name().unwrap_or_else(|_| "output device".into());
    let supported = match device.default_output_config() {
        Ok(config) => config,
        Err(e) => {
            let _ = ready.send(Err(e.into()));
            return;
        }
    };

    let channels = supported.channels() as usize;
    let device_rate = supported.sample_rate().0 as f64;
    let mono = pcm::resample(
        &pcm::pcm16_to_f32(&clip.samples),
        clip.format.sample_rate as f64,
        device_rate,
    );
    let cursor = Arc::new(PlaybackCursor {
        samples: pcm::fan_out(&mono, channels),
        position: AtomicUsize::new(0),
        failed: AtomicBool::new(false),
    });

    let config = supported.config();
    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_output::<f32>(&device, &config, &cursor),
        cpal::SampleFormat::F64 => build_output::<f64>(&device, &config, &cursor),
        cpal::SampleFormat::I8 => build_output::<i8>(&device, &config, &cursor),
        cpal::SampleFormat::I16 => build_output::<i16>(&device, &config, &cursor),
        cpal::SampleFormat::I32 => build_output::<i32>(&device, &config, &cursor),
        cpal::SampleFormat::U8 => build_output::<u8>(&device, &config, &cursor),
        cpal::SampleFormat::U16 => build_output::<u16>(&device, &config, &cursor),
        other => Err(BackendError::UnsupportedFormat(other)),
    };
    let stream = match stream.and_then(|s| s.play().map(|_| s).map_err(BackendError::from)) {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("Output stream on {} failed to start: {}", name, e);
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(name));

    while !stopped.load(Ordering::SeqCst) && !cursor.is_drained() && !cursor.failed.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(10));
    }
    // Let the device drain its last period before tearing the stream down.
    if cursor.is_drained() {
        thread::sleep(Duration::from_millis(100));
    }
    drop(stream);

    if stopped.load(Ordering::SeqCst) {
        log::debug!("Playback stopped before completion");
        return;
    }
    events.playback_finished(!cursor.failed.load(Ordering::SeqCst));
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    cursor: &Arc<PlaybackCursor>,
) -> Result<cpal::Stream, BackendError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let data_cursor = Arc::clone(cursor);
    let error_cursor = Arc::clone(cursor);
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let start = data_cursor.position.load(Ordering::Relaxed);
            for (i, out) in data.iter_mut().enumerate() {
                let sample = data_cursor.samples.get(start + i).copied().unwrap_or(0.0);
                *out = T::from_sample(sample);
            }
            let end = (start + data.len()).min(data_cursor.samples.len());
            data_cursor.position.store(end, Ordering::Relaxed);
        },
        move |e| {
            log::error!("Output stream error: {}", e);
            error_cursor.failed.store(true, Ordering::SeqCst);
        },
        None,
    )?;
    Ok(stream)
}
