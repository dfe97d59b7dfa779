pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::interview::handlers as interview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview pipeline
        .route("/start_interview", post(interview::handle_start_interview))
        .route("/stop_interview", post(interview::handle_stop_interview))
        .route(
            "/generate_response",
            post(interview::handle_generate_response),
        )
        .route("/transcribe", post(interview::handle_transcribe))
        .route("/devices", get(interview::handle_list_devices))
        // Auth (external identity provider boundary)
        .route("/auth/signup", post(auth::handle_signup))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/verify_token", post(auth::handle_verify_token))
        .route("/auth/password_reset", post(auth::handle_password_reset))
        .route(
            "/auth/password_reset/confirm",
            post(auth::handle_password_reset_confirm),
        )
        .route("/auth/logout", post(auth::handle_logout))
        .with_state(state)
}
