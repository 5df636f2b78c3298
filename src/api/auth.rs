//! Email/password authentication against the hosted auth service.
//!
//! The service speaks camelCase JSON. Sign-in and sign-up both answer with a
//! `session` object carrying the access token and the user record; sign-out
//! takes the refresh token and revokes it server-side.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::AuthSession;

/// Errors from the auth service.
#[derive(Debug)]
pub enum AuthError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The service rejected the request (bad credentials, existing account).
    Rejected { status: u16, message: String },
    /// Response body did not have the expected shape.
    Parse(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Network(msg) => write!(f, "network error: {msg}"),
            AuthError::Rejected { status, message } => {
                write!(f, "auth rejected (HTTP {status}): {message}")
            }
            AuthError::Parse(msg) => write!(f, "auth parse error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    session: Option<SessionBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    access_token: String,
    refresh_token: String,
    user: UserBody,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
    email: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.credential_request("/signin/email-password", email, password)
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.credential_request("/signup/email-password", email, password)
            .await
    }

    /// Revokes the refresh token. Local state is already gone by the time
    /// this runs, so a failure only gets logged.
    pub async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError> {
        let url = format!("{}/signout", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Sign-out revocation failed: HTTP {}", status.as_u16());
        }
        Ok(())
    }

    async fn credential_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&CredentialsBody { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.message.or(e.error))
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: SessionEnvelope =
            serde_json::from_str(&body).map_err(|e| AuthError::Parse(e.to_string()))?;
        let session = envelope.session.ok_or_else(|| {
            // Sign-up with email verification enabled answers 200 with a
            // null session. Surface it as a rejection the form can show.
            AuthError::Rejected {
                status: status.as_u16(),
                message: "no session returned; account may need verification".to_string(),
            }
        })?;

        Ok(AuthSession {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            user_id: session.user.id,
            email: session.user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_envelope_parses_camel_case() {
        let json = r#"{
            "session": {
                "accessToken": "jwt-abc",
                "refreshToken": "ref-def",
                "user": {"id": "u1", "email": "a@b.c"}
            }
        }"#;
        let envelope: SessionEnvelope = serde_json::from_str(json).unwrap();
        let session = envelope.session.unwrap();
        assert_eq!(session.access_token, "jwt-abc");
        assert_eq!(session.user.id, "u1");
    }

    #[test]
    fn test_null_session_parses() {
        let json = r#"{"session": null, "mfa": null}"#;
        let envelope: SessionEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.session.is_none());
    }

    #[test]
    fn test_error_envelope_prefers_message() {
        let json = r#"{"status": 401, "message": "Incorrect email or password", "error": "invalid-email-password"}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope.message.or(envelope.error).as_deref(),
            Some("Incorrect email or password")
        );
    }
}
