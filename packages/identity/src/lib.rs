#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session verification contract for the noise map server.
//!
//! Authentication is delegated entirely to an external identity provider.
//! The core consumes exactly two things: a verified identity string and an
//! authenticated/unauthenticated outcome. Session-cookie mechanics,
//! token issuance, and revocation are the provider's concern.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from session verification.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The session token is missing, expired, or was rejected by the
    /// provider.
    #[error("Invalid session")]
    InvalidSession,

    /// The identity provider could not be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Required configuration is not set.
    #[error("Missing configuration: {name}")]
    MissingConfig {
        /// Name of the missing environment variable.
        name: &'static str,
    },
}

/// Resolves a session token to a verified identity.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Verifies a session token and returns the identity it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidSession`] if the token is rejected,
    /// or [`IdentityError::Http`] if the provider is unreachable.
    async fn verify(&self, session_token: &str) -> Result<String, IdentityError>;
}

/// Shape of the identity provider's verify response.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    uid: String,
}

/// Session verifier backed by the external identity provider's
/// verify-session endpoint.
pub struct HttpSessionVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpSessionVerifier {
    /// Creates a verifier against the given endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, verify_url: String) -> Self {
        Self { client, verify_url }
    }

    /// Builds the verifier from the `AUTH_VERIFY_URL` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingConfig`] if `AUTH_VERIFY_URL` is not
    /// set.
    pub fn from_env(client: reqwest::Client) -> Result<Self, IdentityError> {
        let verify_url = std::env::var("AUTH_VERIFY_URL").map_err(|_| {
            IdentityError::MissingConfig {
                name: "AUTH_VERIFY_URL",
            }
        })?;

        Ok(Self::new(client, verify_url))
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn verify(&self, session_token: &str) -> Result<String, IdentityError> {
        let resp = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "session": session_token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(IdentityError::InvalidSession);
        }

        let body: VerifyResponse = resp.json().await.map_err(|e| {
            log::warn!("Identity provider returned an unparseable verify response: {e}");
            IdentityError::InvalidSession
        })?;

        Ok(body.uid)
    }
}

/// Fixed token-to-identity mapping for tests and local development.
#[derive(Debug, Default)]
pub struct StaticSessionVerifier {
    sessions: BTreeMap<String, String>,
}

impl StaticSessionVerifier {
    /// Creates a verifier from `(token, uid)` pairs.
    #[must_use]
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            sessions: pairs
                .iter()
                .map(|(token, uid)| ((*token).to_string(), (*uid).to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl SessionVerifier for StaticSessionVerifier {
    async fn verify(&self, session_token: &str) -> Result<String, IdentityError> {
        self.sessions
            .get(session_token)
            .cloned()
            .ok_or(IdentityError::InvalidSession)
    }
}
