//! Speech Capture Adapter — bounded microphone capture plus HTTP recognition.
//!
//! `capture` blocks for a calibration window, a wait-for-speech window, and a
//! bounded phrase recording (all configurable), then hands the recording to a
//! `Recognizer`. Outcomes are data, not exceptions: every low-level failure
//! maps to a `TranscriptionResult::Failure` reason. Never retried here — the
//! caller decides whether to re-invoke.

pub mod capture;
pub mod devices;
pub mod recognizer;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::speech::capture::{record_phrase, CaptureError};
use crate::speech::recognizer::{Recognizer, RecognizerError};

/// Timing knobs for one capture. All three windows come from config, never
/// hardcoded at the call site.
#[derive(Debug, Clone)]
pub struct ListenConfig {
    /// Ambient-noise calibration window before listening starts.
    pub calibration: Duration,
    /// How long to wait for speech to begin.
    pub speech_timeout: Duration,
    /// Maximum recorded phrase length.
    pub phrase_limit: Duration,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            calibration: Duration::from_millis(1000),
            speech_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    NoSpeech,
    Unintelligible,
    ServiceUnavailable,
    DeviceError,
}

impl FailureReason {
    /// Human-readable message surfaced to HTTP clients.
    pub fn message(&self) -> &'static str {
        match self {
            FailureReason::NoSpeech => "No speech detected.",
            FailureReason::Unintelligible => "Could not understand audio.",
            FailureReason::ServiceUnavailable => "Service unavailable.",
            FailureReason::DeviceError => "Audio device error.",
        }
    }
}

/// Outcome of one capture attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TranscriptionResult {
    Success { text: String },
    Failure { reason: FailureReason },
}

/// Microphone capture front-end. Cheap to construct; the audio host is only
/// touched while a capture is in flight.
pub struct SpeechCapture {
    recognizer: Arc<dyn Recognizer>,
    config: ListenConfig,
    /// One microphone: concurrent captures would race the device.
    mic: tokio::sync::Mutex<()>,
}

impl SpeechCapture {
    pub fn new(recognizer: Arc<dyn Recognizer>, config: ListenConfig) -> Self {
        Self {
            recognizer,
            config,
            mic: tokio::sync::Mutex::new(()),
        }
    }

    /// Captures one spoken phrase and transcribes it.
    ///
    /// The hardware wait runs on the blocking pool so a microphone wait can
    /// never stall other requests on the async runtime.
    pub async fn capture(&self, device_index: Option<usize>) -> TranscriptionResult {
        let _mic = self.mic.lock().await;

        let listen = self.config.clone();
        let recorded =
            tokio::task::spawn_blocking(move || record_phrase(device_index, &listen)).await;

        let recording = match recorded {
            Ok(Ok(recording)) => recording,
            Ok(Err(e)) => {
                return TranscriptionResult::Failure {
                    reason: capture_failure(&e),
                }
            }
            Err(e) => {
                warn!("Capture task panicked: {e}");
                return TranscriptionResult::Failure {
                    reason: FailureReason::DeviceError,
                };
            }
        };

        resolve_recognition(self.recognizer.recognize(&recording).await)
    }
}

fn capture_failure(error: &CaptureError) -> FailureReason {
    match error {
        CaptureError::NoSpeech => FailureReason::NoSpeech,
        CaptureError::Device(msg) => {
            warn!("Audio device failure: {msg}");
            FailureReason::DeviceError
        }
    }
}

/// Maps a recognizer outcome onto the transcription contract: an empty
/// transcript means the speech was unintelligible, any service failure means
/// the recognizer was unreachable.
fn resolve_recognition(
    recognized: Result<Option<String>, RecognizerError>,
) -> TranscriptionResult {
    match recognized {
        Ok(Some(text)) => TranscriptionResult::Success { text },
        Ok(None) => TranscriptionResult::Failure {
            reason: FailureReason::Unintelligible,
        },
        Err(e) => {
            warn!("Recognition service failure: {e}");
            TranscriptionResult::Failure {
                reason: FailureReason::ServiceUnavailable,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_text_is_success() {
        let result = resolve_recognition(Ok(Some("tell me about yourself".to_string())));
        assert_eq!(
            result,
            TranscriptionResult::Success {
                text: "tell me about yourself".to_string()
            }
        );
    }

    #[test]
    fn test_empty_transcript_is_unintelligible() {
        let result = resolve_recognition(Ok(None));
        assert_eq!(
            result,
            TranscriptionResult::Failure {
                reason: FailureReason::Unintelligible
            }
        );
    }

    #[test]
    fn test_service_error_is_service_unavailable() {
        let result = resolve_recognition(Err(RecognizerError::Api {
            status: 503,
            message: "backend overloaded".to_string(),
        }));
        assert_eq!(
            result,
            TranscriptionResult::Failure {
                reason: FailureReason::ServiceUnavailable
            }
        );
    }

    #[test]
    fn test_capture_errors_map_to_reasons() {
        assert_eq!(capture_failure(&CaptureError::NoSpeech), FailureReason::NoSpeech);
        assert_eq!(
            capture_failure(&CaptureError::Device("stream died".to_string())),
            FailureReason::DeviceError
        );
    }

    #[test]
    fn test_failure_messages_are_stable() {
        assert_eq!(FailureReason::NoSpeech.message(), "No speech detected.");
        assert_eq!(
            FailureReason::Unintelligible.message(),
            "Could not understand audio."
        );
    }
}
