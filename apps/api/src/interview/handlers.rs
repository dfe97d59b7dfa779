//! Axum route handlers for the interview endpoints.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthedUser;
use crate::errors::AppError;
use crate::interview::jd_analyzer::{self, JobSummary};
use crate::interview::session::SessionState;
use crate::speech::devices::{self, DeviceInfo};
use crate::speech::TranscriptionResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub resume: String,
    pub job_description: JobSummary,
    pub introduction: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponseRequest {
    /// Defaulted so an absent field reaches the pipeline as blank and gets
    /// the 400 "Question is required." response instead of dying in the
    /// Json extractor as a 422.
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponseResponse {
    pub response: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranscribeRequest {
    pub device_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

#[derive(Debug, Serialize)]
pub struct StopInterviewResponse {
    pub stopped: bool,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceInfo>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /start_interview
///
/// Multipart upload: `resume` (PDF file) + `job_description` (text field).
/// Runs the full start pipeline and replaces any interview already attached
/// to this auth session.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MissingInput(format!("Malformed upload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::MissingInput(format!("Malformed upload: {e}")))?;
                resume = Some((filename, bytes));
            }
            Some("job_description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::MissingInput(format!("Malformed upload: {e}")))?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let ((filename, document), job_description) = match (resume, job_description) {
        (Some(resume), Some(jd)) => (resume, jd),
        _ => {
            return Err(AppError::MissingInput(
                "Both resume and job description are required.".to_string(),
            ))
        }
    };

    let outcome = state
        .pipeline
        .start(&filename, &document, &job_description)
        .await?;
    info!("Interview started for user {}", user.uid);

    let response = StartInterviewResponse {
        resume: outcome.session.resume_text.clone(),
        job_description: outcome.session.job_summary.clone(),
        introduction: outcome.introduction,
    };

    state
        .interviews
        .lock()
        .expect("interview store lock poisoned")
        .insert(user.token, outcome.session);

    Ok(Json(response))
}

/// POST /generate_response
///
/// Answers one interview question. Uses the interview attached to the
/// caller's session when present; otherwise builds an ephemeral session from
/// the request body (the route is usable without a prior upload).
pub async fn handle_generate_response(
    State(state): State<AppState>,
    user: Option<AuthedUser>,
    Json(request): Json<GenerateResponseRequest>,
) -> Result<Json<GenerateResponseResponse>, AppError> {
    let key = user.map(|u| u.token);

    // Clone-out/write-back: the session is copied here, mutated across the
    // generation await, and reinserted below. Concurrent requests on the
    // same token can interleave turns; a session models one interview at a
    // time, so the store takes no per-session lock.
    let stored = key.and_then(|k| {
        state
            .interviews
            .lock()
            .expect("interview store lock poisoned")
            .get(&k)
            .cloned()
    });
    let from_store = stored.is_some();

    let mut session = stored.unwrap_or_else(|| {
        SessionState::new(
            request.resume_text.clone(),
            jd_analyzer::analyze(&request.job_description),
            state.config.max_turns,
        )
    });

    let answer = state.pipeline.respond(&mut session, &request.question).await?;

    if from_store {
        if let Some(k) = key {
            state
                .interviews
                .lock()
                .expect("interview store lock poisoned")
                .insert(k, session);
        }
    }

    Ok(Json(GenerateResponseResponse { response: answer }))
}

/// POST /transcribe
///
/// Captures one spoken question from the microphone. The body is optional;
/// when present it may pick a device from GET /devices.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    user: Option<AuthedUser>,
    body: Option<Json<TranscribeRequest>>,
) -> Result<Json<TranscribeResponse>, AppError> {
    let device_index = body.and_then(|Json(b)| b.device_index);
    let key = user.map(|u| u.token);

    // Same clone-out/write-back scheme as /generate_response; see the note
    // there about concurrent requests on one session token.
    let mut session = key.and_then(|k| {
        state
            .interviews
            .lock()
            .expect("interview store lock poisoned")
            .get(&k)
            .cloned()
    });

    let result = state
        .pipeline
        .transcribe(session.as_mut(), device_index)
        .await;

    if let (Some(k), Some(session)) = (key, session) {
        state
            .interviews
            .lock()
            .expect("interview store lock poisoned")
            .insert(k, session);
    }

    match result {
        TranscriptionResult::Success { text } => Ok(Json(TranscribeResponse {
            transcription: text,
        })),
        TranscriptionResult::Failure { reason } => {
            Err(AppError::Transcription(reason.message().to_string()))
        }
    }
}

/// POST /stop_interview — discards the caller's interview session.
pub async fn handle_stop_interview(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Json<StopInterviewResponse> {
    let removed = state
        .interviews
        .lock()
        .expect("interview store lock poisoned")
        .remove(&user.token);

    if let Some(mut session) = removed {
        state.pipeline.stop(&mut session);
        info!("Interview stopped after {} turn(s)", session.turns().len());
        Json(StopInterviewResponse { stopped: true })
    } else {
        Json(StopInterviewResponse { stopped: false })
    }
}

/// GET /devices — input devices usable as `device_index` for /transcribe.
pub async fn handle_list_devices() -> Result<Json<DevicesResponse>, AppError> {
    let devices = devices::list_input_devices().map_err(AppError::Internal)?;
    Ok(Json(DevicesResponse { devices }))
}
