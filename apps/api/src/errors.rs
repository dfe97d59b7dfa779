use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The wire shape is a flat `{"error": "<message>"}` object; clients key off
/// the message text, so every variant carries a human-readable cause.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Only PDF resumes are supported.")]
    UnsupportedFormat,

    #[error("Error processing resume: {0}")]
    CorruptDocument(String),

    #[error("Error generating response: {0}")]
    GenerationFailed(String),

    #[error("{0}")]
    Transcription(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UnsupportedFormat => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::CorruptDocument(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::GenerationFailed(msg) => {
                tracing::error!("Generation error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Transcription(msg) => {
                tracing::warn!("Transcription failed: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::AuthRequired => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}
