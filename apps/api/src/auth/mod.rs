//! Authentication boundary: external identity provider + cookie sessions.
//!
//! The pipeline only needs "is there an authenticated session" as a gate;
//! everything provider-specific stays behind the `IdentityProvider` trait.

pub mod handlers;
pub mod provider;
pub mod session;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Extractor for the authenticated user. Rejects with `AuthRequired` when
/// the session cookie is missing, malformed, or revoked. Use
/// `Option<AuthedUser>` on routes that merely want to know who is calling.
pub struct AuthedUser {
    pub uid: String,
    pub token: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .ok_or(AppError::AuthRequired)?;

        let uid = state
            .auth_sessions
            .resolve(token)
            .ok_or(AppError::AuthRequired)?;

        Ok(AuthedUser { uid, token })
    }
}
