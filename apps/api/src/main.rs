mod auth;
mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod speech;
mod state;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::provider::IdentityToolkitProvider;
use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::interview::pipeline::InterviewPipeline;
use crate::llm_client::GenerationClient;
use crate::routes::build_router;
use crate::speech::recognizer::GoogleSpeechRecognizer;
use crate::speech::{ListenConfig, SpeechCapture};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parley API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation client
    let generator = Arc::new(GenerationClient::new(
        config.gemini_api_key.clone(),
        config.generation_model.clone(),
        Duration::from_secs(config.generation_timeout_secs),
    ));
    info!("Generation client initialized (model: {})", generator.model());

    // Initialize speech capture
    let recognizer = Arc::new(GoogleSpeechRecognizer::new(
        config.speech_api_key.clone(),
        Duration::from_secs(config.recognition_timeout_secs),
    ));
    let listen = ListenConfig {
        calibration: Duration::from_millis(config.calibration_ms),
        speech_timeout: Duration::from_secs(config.listen_timeout_secs),
        phrase_limit: Duration::from_secs(config.phrase_limit_secs),
    };
    let speech = SpeechCapture::new(recognizer, listen);
    info!("Speech capture initialized");

    // Initialize interview pipeline
    let pipeline = Arc::new(InterviewPipeline::new(generator, speech, config.max_turns));

    // Initialize identity provider + session store
    let identity = Arc::new(IdentityToolkitProvider::new(
        config.identity_api_key.clone(),
        Duration::from_secs(config.identity_timeout_secs),
    ));
    let auth_sessions = Arc::new(SessionStore::new());
    info!("Identity provider initialized");

    // Build app state
    let state = AppState {
        pipeline,
        identity,
        auth_sessions,
        interviews: Arc::new(Mutex::new(HashMap::new())),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
