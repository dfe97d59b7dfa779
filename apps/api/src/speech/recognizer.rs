//! Recognizer port — turns a recording into text via a speech service.
//!
//! The trait is the seam the adapter tests substitute; production uses the
//! Google Speech REST implementation, matching the service the product has
//! always transcribed against.

use async_trait::async_trait;
use base64::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::speech::capture::Recording;

const SPEECH_API_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Port for speech recognition. `Ok(None)` means the service heard the audio
/// but produced no transcript.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, recording: &Recording) -> Result<Option<String>, RecognizerError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<SpeechResult>,
}

#[derive(Debug, Deserialize)]
struct SpeechResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

impl RecognizeResponse {
    fn transcript(self) -> Option<String> {
        self.results
            .into_iter()
            .next()?
            .alternatives
            .into_iter()
            .find_map(|a| a.transcript)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Google Speech recognizer over the synchronous `speech:recognize` endpoint.
pub struct GoogleSpeechRecognizer {
    client: Client,
    api_key: String,
}

impl GoogleSpeechRecognizer {
    pub fn new(api_key: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl Recognizer for GoogleSpeechRecognizer {
    async fn recognize(&self, recording: &Recording) -> Result<Option<String>, RecognizerError> {
        let request_body = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: recording.sample_rate,
                language_code: "en-US",
            },
            audio: RecognitionAudio {
                content: BASE64_STANDARD.encode(pcm_bytes(&recording.samples)),
            },
        };

        let response = self
            .client
            .post(format!("{SPEECH_API_URL}?key={}", self.api_key))
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognizerError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let recognized: RecognizeResponse = response.json().await?;
        let transcript = recognized.transcript();
        debug!(
            "Recognition returned {}",
            if transcript.is_some() {
                "a transcript"
            } else {
                "no transcript"
            }
        );
        Ok(transcript)
    }
}

/// Serializes samples as little-endian 16-bit PCM.
fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}
