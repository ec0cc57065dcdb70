//! Login and registration against the auth service

use serde::{Deserialize, Serialize};

use super::credentials::{Credentials, UserProfile};
use super::guard::AuthGuard;
use crate::error::AuthError;
use crate::service::error_message;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Client for `POST /auth/login` and `POST /auth/register`
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    guard: AuthGuard,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, guard: AuthGuard) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            guard,
        }
    }

    pub fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    /// Exchange email/password for a bearer token and persist it
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, AuthError> {
        let body = LoginRequest { email, password };
        self.exchange("auth/login", &body, "Login failed. Please try again.")
            .await
    }

    /// Create an account and persist the issued token
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Credentials, AuthError> {
        let body = RegisterRequest {
            name,
            email,
            password,
        };
        self.exchange(
            "auth/register",
            &body,
            "Registration failed. Please try again.",
        )
        .await
    }

    /// Drop the stored credentials
    pub fn logout(&self) -> Result<(), AuthError> {
        self.guard.sign_out()
    }

    async fn exchange<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<Credentials, AuthError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            // A 401 here means bad credentials, not an expired session.
            let message = error_message(&text).unwrap_or_else(|| fallback.to_string());
            tracing::warn!("{} rejected ({}): {}", path, status, message);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        let credentials = Credentials {
            access_token: token.access_token,
            token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
            user: token.user,
        };

        self.guard.sign_in(&credentials)?;
        tracing::info!(
            "Signed in as {}",
            credentials.user_id().unwrap_or("<unknown user>")
        );

        Ok(credentials)
    }
}
