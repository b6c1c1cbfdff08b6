use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::auth_provider::{AuthError, AuthProvider};
use crate::infrastructure::config::AuthConfig;

#[derive(Deserialize)]
struct SupabaseUser {
    id: String,
}

/// Verifies access tokens against the Supabase auth `user` endpoint.
pub struct SupabaseAuthProvider {
    client: Client,
    user_endpoint: String,
    anon_key: String,
}

impl SupabaseAuthProvider {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            user_endpoint: format!("{}/auth/v1/user", config.supabase_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn verify(&self, bearer_token: &str) -> Result<String, AuthError> {
        if bearer_token.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let response = self
            .client
            .get(&self.user_endpoint)
            .bearer_auth(bearer_token)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                return Err(AuthError::InvalidCredential(format!("HTTP {}: {}", status, body)));
            }
            _ => {
                return Err(AuthError::ProviderUnavailable(format!("HTTP {}", status)));
            }
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;

        if user.id.is_empty() {
            return Err(AuthError::InvalidCredential("user has no id".to_string()));
        }

        debug!("Verified token for user {}", user.id);
        Ok(user.id)
    }
}
