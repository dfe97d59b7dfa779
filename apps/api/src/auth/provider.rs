//! Identity provider port and its Identity Toolkit REST implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use thiserror::Error;

const IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused the request (bad credentials, unknown token,
    /// malformed reset code). The message is the provider's own.
    #[error("{message}")]
    Rejected { message: String },
}

/// Port for the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a user, returning its uid.
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Verifies an ID token, returning the uid it belongs to.
    async fn verify_token(&self, id_token: &str) -> Result<String, IdentityError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;

    async fn confirm_password_reset(
        &self,
        oob_code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Identity Toolkit (Firebase-style) provider over its REST accounts API.
pub struct IdentityToolkitProvider {
    client: Client,
    api_key: String,
}

impl IdentityToolkitProvider {
    pub fn new(api_key: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &serde_json::Value,
    ) -> Result<T, IdentityError> {
        let url = format!("{IDENTITY_API_BASE}/accounts:{operation}?key={}", self.api_key);

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(IdentityError::Rejected { message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let response: SignUpResponse = self
            .post_json(
                "signUp",
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(response.local_id)
    }

    async fn verify_token(&self, id_token: &str) -> Result<String, IdentityError> {
        let response: LookupResponse = self
            .post_json("lookup", &json!({ "idToken": id_token }))
            .await?;
        response
            .users
            .into_iter()
            .next()
            .map(|user| user.local_id)
            .ok_or(IdentityError::Rejected {
                message: "Token does not resolve to a user".to_string(),
            })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post_json(
                "sendOobCode",
                &json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        oob_code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post_json(
                "resetPassword",
                &json!({ "oobCode": oob_code, "newPassword": new_password }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_response_parses_local_id() {
        let raw = r#"{"localId": "uid-123", "email": "a@b.c", "idToken": "tok"}"#;
        let parsed: SignUpResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.local_id, "uid-123");
    }

    #[test]
    fn test_lookup_response_parses_first_user() {
        let raw = r#"{"users": [{"localId": "uid-456"}]}"#;
        let parsed: LookupResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.users[0].local_id, "uid-456");
    }

    #[test]
    fn test_provider_error_message_parses() {
        let raw = r#"{"error": {"message": "EMAIL_EXISTS", "code": 400}}"#;
        let parsed: ProviderError = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "EMAIL_EXISTS");
    }
}
