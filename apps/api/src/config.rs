use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub speech_api_key: String,
    pub identity_api_key: String,
    pub generation_model: String,
    pub generation_timeout_secs: u64,
    /// HTTP timeout for the speech recognition service.
    pub recognition_timeout_secs: u64,
    /// HTTP timeout for the identity provider.
    pub identity_timeout_secs: u64,
    /// Ambient-noise calibration window before listening, in milliseconds.
    pub calibration_ms: u64,
    /// How long to wait for speech to start before giving up, in seconds.
    pub listen_timeout_secs: u64,
    /// Maximum recorded phrase length, in seconds.
    pub phrase_limit_secs: u64,
    /// Turn-history ring capacity per interview session.
    pub max_turns: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            speech_api_key: require_env("SPEECH_API_KEY")?,
            identity_api_key: require_env("IDENTITY_API_KEY")?,
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "gemini-pro".to_string()),
            generation_timeout_secs: parse_env("GENERATION_TIMEOUT_SECS", 30)?,
            recognition_timeout_secs: parse_env("RECOGNITION_TIMEOUT_SECS", 15)?,
            identity_timeout_secs: parse_env("IDENTITY_TIMEOUT_SECS", 10)?,
            calibration_ms: parse_env("CALIBRATION_MS", 1000)?,
            listen_timeout_secs: parse_env("LISTEN_TIMEOUT_SECS", 5)?,
            phrase_limit_secs: parse_env("PHRASE_LIMIT_SECS", 30)?,
            max_turns: parse_env("MAX_TURNS", 10)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
