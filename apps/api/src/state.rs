use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::auth::provider::IdentityProvider;
use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::interview::pipeline::InterviewPipeline;
use crate::interview::session::SessionState;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InterviewPipeline>,
    /// Pluggable identity provider. Production: Identity Toolkit REST;
    /// tests substitute a double.
    pub identity: Arc<dyn IdentityProvider>,
    pub auth_sessions: Arc<SessionStore>,
    /// Live interview sessions, keyed by the auth session token. In-memory
    /// only — sessions die with the process or on logout/stop.
    pub interviews: Arc<Mutex<HashMap<Uuid, SessionState>>>,
    pub config: Config,
}
