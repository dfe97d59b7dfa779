//! Axum route handlers for the auth endpoints.
//!
//! These mirror the identity provider's own outcome shape: 200 with
//! `{"success": bool, ...}` rather than HTTP error codes, so the client can
//! show the provider's message directly.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::provider::IdentityError;
use crate::auth::SESSION_COOKIE;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub oob_code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    fn ok(uid: Option<String>) -> Self {
        Self {
            success: true,
            uid,
            error: None,
        }
    }

    fn err(e: IdentityError) -> Self {
        Self {
            success: false,
            uid: None,
            error: Some(e.to_string()),
        }
    }
}

fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .build()
}

/// POST /auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> (CookieJar, Json<AuthResponse>) {
    match state.identity.sign_up(&request.email, &request.password).await {
        Ok(uid) => {
            let token = state.auth_sessions.issue(uid.clone());
            info!("New user signed up");
            (
                jar.add(session_cookie(token)),
                Json(AuthResponse::ok(Some(uid))),
            )
        }
        Err(e) => (jar, Json(AuthResponse::err(e))),
    }
}

/// POST /auth/login — verifies a provider-issued ID token and opens a session.
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<TokenRequest>,
) -> (CookieJar, Json<AuthResponse>) {
    match state.identity.verify_token(&request.id_token).await {
        Ok(uid) => {
            let token = state.auth_sessions.issue(uid.clone());
            (
                jar.add(session_cookie(token)),
                Json(AuthResponse::ok(Some(uid))),
            )
        }
        Err(e) => (jar, Json(AuthResponse::err(e))),
    }
}

/// POST /auth/verify_token — same verification as login; kept as its own
/// route because clients call it to refresh an existing session.
pub async fn handle_verify_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<TokenRequest>,
) -> (CookieJar, Json<AuthResponse>) {
    handle_login(State(state), jar, Json(request)).await
}

/// POST /auth/password_reset
pub async fn handle_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Json<AuthResponse> {
    match state.identity.send_password_reset(&request.email).await {
        Ok(()) => Json(AuthResponse::ok(None)),
        Err(e) => Json(AuthResponse::err(e)),
    }
}

/// POST /auth/password_reset/confirm
pub async fn handle_password_reset_confirm(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirmRequest>,
) -> Json<AuthResponse> {
    match state
        .identity
        .confirm_password_reset(&request.oob_code, &request.new_password)
        .await
    {
        Ok(()) => Json(AuthResponse::ok(None)),
        Err(e) => Json(AuthResponse::err(e)),
    }
}

/// POST /auth/logout — revokes the session and discards any interview state
/// attached to it.
pub async fn handle_logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<AuthResponse>) {
    if let Some(token) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        state.auth_sessions.revoke(token);
        state
            .interviews
            .lock()
            .expect("interview store lock poisoned")
            .remove(&token);
    }

    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(AuthResponse::ok(None)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_omits_absent_fields() {
        let raw = serde_json::to_string(&AuthResponse::ok(None)).unwrap();
        assert_eq!(raw, r#"{"success":true}"#);
    }

    #[test]
    fn test_auth_response_carries_uid() {
        let raw = serde_json::to_string(&AuthResponse::ok(Some("uid-1".to_string()))).unwrap();
        assert_eq!(raw, r#"{"success":true,"uid":"uid-1"}"#);
    }

    #[test]
    fn test_auth_response_carries_error_message() {
        let response = AuthResponse::err(IdentityError::Rejected {
            message: "EMAIL_EXISTS".to_string(),
        });
        let raw = serde_json::to_string(&response).unwrap();
        assert_eq!(raw, r#"{"success":false,"error":"EMAIL_EXISTS"}"#);
    }

    #[test]
    fn test_session_cookie_is_http_only() {
        let cookie = session_cookie(Uuid::new_v4());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
    }
}
