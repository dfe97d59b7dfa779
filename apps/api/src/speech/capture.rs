//! Blocking microphone capture with an RMS energy gate.
//!
//! Three phases, each bounded by `ListenConfig`: calibrate against ambient
//! noise, wait for speech to start, record until trailing silence or the
//! phrase limit. Runs on the blocking pool; see `SpeechCapture::capture`.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use thiserror::Error;
use tracing::debug;

use crate::speech::ListenConfig;

/// How often the capture loop samples the shared buffer.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Window over which speech activity is measured.
const ACTIVITY_WINDOW: Duration = Duration::from_millis(200);
/// Trailing silence that ends a phrase.
const TRAILING_SILENCE: Duration = Duration::from_millis(800);
/// Energy threshold floor for silent rooms.
const THRESHOLD_FLOOR: f32 = 0.01;
/// Ambient RMS is scaled by this factor to get the speech threshold.
const AMBIENT_MARGIN: f32 = 1.5;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no speech detected within the listen window")]
    NoSpeech,

    #[error("audio device error: {0}")]
    Device(String),
}

/// Mono PCM recording at the device's native sample rate.
#[derive(Debug, Clone)]
pub struct Recording {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Records one phrase from the given input device (or the default device).
///
/// Blocking: returns once speech has been captured, the listen window timed
/// out, or the device failed. Stream teardown is scoped — the cpal stream is
/// dropped on every exit path.
pub fn record_phrase(
    device_index: Option<usize>,
    config: &ListenConfig,
) -> Result<Recording, CaptureError> {
    let host = cpal::default_host();

    let device = match device_index {
        Some(index) => host
            .input_devices()
            .map_err(|e| CaptureError::Device(e.to_string()))?
            .nth(index)
            .ok_or_else(|| CaptureError::Device(format!("no input device at index {index}")))?,
        None => host
            .default_input_device()
            .ok_or_else(|| CaptureError::Device("no default input device".to_string()))?,
    };

    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::Device(e.to_string()))?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.config();
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    debug!(
        "Capturing from '{}' at {} Hz, {} channel(s), {:?}",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        sample_rate,
        channels,
        sample_format
    );

    let buffer: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let err_sink = Arc::clone(&stream_error);
    let err_fn = move |e: cpal::StreamError| {
        let mut slot = err_sink.lock().expect("stream error lock poisoned");
        *slot = Some(e.to_string());
    };

    let stream = match sample_format {
        SampleFormat::F32 => {
            let sink = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    sink.lock().expect("capture lock poisoned").extend_from_slice(data);
                },
                err_fn,
                None,
            )
        }
        SampleFormat::I16 => {
            let sink = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mut sink = sink.lock().expect("capture lock poisoned");
                    sink.extend(data.iter().map(|&s| s as f32 / 32768.0));
                },
                err_fn,
                None,
            )
        }
        SampleFormat::U16 => {
            let sink = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let mut sink = sink.lock().expect("capture lock poisoned");
                    sink.extend(data.iter().map(|&s| (s as f32 - 32768.0) / 32768.0));
                },
                err_fn,
                None,
            )
        }
        other => {
            return Err(CaptureError::Device(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(|e| CaptureError::Device(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::Device(e.to_string()))?;

    let window_len = (sample_rate as f32 * ACTIVITY_WINDOW.as_secs_f32()) as usize
        * channels as usize;

    // Phase 1: ambient-noise calibration.
    std::thread::sleep(config.calibration);
    check_stream(&stream_error)?;
    let ambient = {
        let samples = buffer.lock().expect("capture lock poisoned");
        rms(&samples)
    };
    let threshold = (ambient * AMBIENT_MARGIN).max(THRESHOLD_FLOOR);
    debug!("Ambient RMS {ambient:.4}, speech threshold {threshold:.4}");

    // Phase 2: wait for speech to start.
    let wait_started = Instant::now();
    let speech_start;
    loop {
        std::thread::sleep(POLL_INTERVAL);
        check_stream(&stream_error)?;
        let samples = buffer.lock().expect("capture lock poisoned");
        let tail_start = samples.len().saturating_sub(window_len);
        if rms(&samples[tail_start..]) > threshold {
            speech_start = tail_start;
            break;
        }
        if wait_started.elapsed() > config.speech_timeout {
            return Err(CaptureError::NoSpeech);
        }
    }

    // Phase 3: record until trailing silence or the phrase limit.
    let phrase_started = Instant::now();
    let mut silent_for = Duration::ZERO;
    loop {
        std::thread::sleep(POLL_INTERVAL);
        check_stream(&stream_error)?;
        let samples = buffer.lock().expect("capture lock poisoned");
        let tail_start = samples.len().saturating_sub(window_len);
        if rms(&samples[tail_start..]) > threshold {
            silent_for = Duration::ZERO;
        } else {
            silent_for += POLL_INTERVAL;
        }
        if silent_for >= TRAILING_SILENCE || phrase_started.elapsed() >= config.phrase_limit {
            break;
        }
    }

    drop(stream);

    let samples = buffer.lock().expect("capture lock poisoned");
    let mono = downmix(&samples[speech_start..], channels);
    debug!(
        "Captured {:.2}s of speech",
        mono.len() as f32 / sample_rate as f32
    );

    Ok(Recording {
        samples: to_i16(&mono),
        sample_rate,
    })
}

fn check_stream(error: &Arc<Mutex<Option<String>>>) -> Result<(), CaptureError> {
    let slot = error.lock().expect("stream error lock poisoned");
    match slot.as_ref() {
        Some(msg) => Err(CaptureError::Device(msg.clone())),
        None => Ok(()),
    }
}

/// Root-mean-square energy of a sample window.
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Averages interleaved channels down to mono.
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Converts normalized f32 samples to 16-bit PCM, clamping out-of-range input.
fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 128]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_of_constant_signal() {
        let signal = [0.5_f32; 64];
        assert!((rms(&signal) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_downmix_stereo_averages_frames() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix(&interleaved, 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_is_identity() {
        let samples = [0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1), samples.to_vec());
    }

    #[test]
    fn test_to_i16_clamps_out_of_range() {
        let converted = to_i16(&[2.0, -2.0, 0.0]);
        assert_eq!(converted, vec![i16::MAX, -i16::MAX, 0]);
    }
}
