//! Hosted auth provider (Supabase GoTrue) client.
//!
//! The browser signs in with the provider directly and hands us its access
//! token. We exchange the token for the user it belongs to and keep that
//! user in the server-side session.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use bramble_core::store::SessionUser;
use bramble_core::{Email, UserId};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use crate::config::SupabaseConfig;

/// User object returned by `GET /auth/v1/user`.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: UserId,
    email: Option<String>,
}

/// Client for the auth provider's user endpoint.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    user_url: String,
    anon_key: String,
}

impl AuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                user_url: format!("{}/auth/v1/user", config.url),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    /// Resolve an access token to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the provider rejects the token,
    /// or another `AuthError` if the request or response is unusable.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<SessionUser, AuthError> {
        let response = self
            .inner
            .client
            .get(&self.inner.user_url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let email = user
            .email
            .ok_or_else(|| AuthError::Parse("user has no email".to_string()))?;

        Ok(SessionUser {
            id: user.id,
            email: Email::parse(&email)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_user_ignores_extra_fields() {
        let json = r#"{
            "id": "7d7b3c52-3f4e-4d8e-9c1a-0f7f6b2a9e11",
            "aud": "authenticated",
            "email": "ada@example.com",
            "app_metadata": {"provider": "email"}
        }"#;
        let user: ProviderUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.to_string(), "7d7b3c52-3f4e-4d8e-9c1a-0f7f6b2a9e11");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }
}
