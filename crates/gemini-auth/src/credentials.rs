//! API credentials for Gemini
//!
//! # Security
//!
//! The API secret is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use secrecy::{ExposeSecret, SecretBox};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::trace;

use crate::error::{AuthError, AuthResult};
use crate::nonce::NonceSource;
use crate::signer::{sign, SignedHeaders, SignedPayload};

/// API credentials for authenticated requests
///
/// Clones share one [`NonceSource`], so a REST client and a socket built
/// from the same credentials never hand the exchange a decreasing nonce.
pub struct Credentials {
    /// API key (public)
    api_key: String,
    /// API secret (zeroized on drop)
    api_secret: SecretBox<Vec<u8>>,
    /// Nonce source shared by all clones
    nonces: Arc<NonceSource>,
}

impl Credentials {
    /// Create new credentials from an API key and secret
    ///
    /// # Returns
    /// Result containing Credentials or error if either value is empty
    pub fn new(api_key: impl Into<String>, api_secret: impl AsRef<str>) -> AuthResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.as_ref();

        if api_key.trim().is_empty() {
            return Err(AuthError::InvalidCredentials("API key is empty".to_string()));
        }
        if api_secret.is_empty() {
            return Err(AuthError::InvalidCredentials("API secret is empty".to_string()));
        }

        Ok(Self {
            api_key,
            api_secret: SecretBox::new(Box::new(api_secret.as_bytes().to_vec())),
            nonces: Arc::new(NonceSource::new()),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `GEMINI_API_KEY` and `GEMINI_API_SECRET` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AuthError::EnvVarNotSet("GEMINI_API_KEY".to_string()))?;
        let api_secret = std::env::var("GEMINI_API_SECRET")
            .map_err(|_| AuthError::EnvVarNotSet("GEMINI_API_SECRET".to_string()))?;

        Self::new(api_key, api_secret)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Draw the next nonce
    pub fn next_nonce(&self) -> u64 {
        self.nonces.next()
    }

    /// Sign a payload with an explicit nonce
    pub fn sign(&self, endpoint: &str, nonce: u64, extra: &Map<String, Value>) -> AuthResult<SignedPayload> {
        sign(endpoint, self.api_secret.expose_secret(), nonce, extra)
    }

    /// Build a fresh header triple for `endpoint`
    ///
    /// Draws a new nonce on every call.
    pub fn signed_headers(&self, endpoint: &str, extra: &Map<String, Value>) -> AuthResult<SignedHeaders> {
        let nonce = self.next_nonce();
        let signed = self.sign(endpoint, nonce, extra)?;
        trace!(endpoint, nonce, "Signed request payload");
        Ok(SignedHeaders::new(self.api_key.clone(), signed, nonce))
    }
}

impl Clone for Credentials {
    /// Clone credentials (creates new SecretBox with same content)
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            api_secret: SecretBox::new(Box::new(self.api_secret.expose_secret().clone())),
            nonces: Arc::clone(&self.nonces),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "api_key",
                &format!("{}...", self.api_key.chars().take(8).collect::<String>()),
            )
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}
