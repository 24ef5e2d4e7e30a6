//! Webhook signature verification.
//!
//! Every delivery is signed by the provider with HMAC-SHA256 over the
//! concatenation of three parts, using the secret chosen when the
//! subscription was created.
//!
//! ## Signed Message
//!
//! - `Twitch-Eventsub-Message-Id` header value
//! - `Twitch-Eventsub-Message-Timestamp` header value (RFC 3339)
//! - the raw request body
//!
//! The `Twitch-Eventsub-Message-Signature` header carries `sha256=` followed
//! by the lowercase hex digest.

use crate::config::DEFAULT_MAX_MESSAGE_AGE;
use crate::error::{ServerError, ServerResult};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use streamstatus_protocol::{MESSAGE_ID, MESSAGE_SIGNATURE, MESSAGE_TIMESTAMP, SIGNATURE_PREFIX};

type HmacSha256 = Hmac<Sha256>;

/// Verification configuration.
#[derive(Clone)]
pub struct VerifierConfig {
    /// Shared webhook secret.
    pub secret: Vec<u8>,
    /// Oldest (and furthest in the future) a message timestamp may be.
    /// `None` disables the replay check.
    pub max_message_age: Option<Duration>,
}

impl VerifierConfig {
    /// Creates a configuration with the default replay window.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            max_message_age: Some(DEFAULT_MAX_MESSAGE_AGE),
        }
    }

    /// Sets the replay window.
    pub fn with_max_message_age(mut self, age: Option<Duration>) -> Self {
        self.max_message_age = age;
        self
    }
}

impl std::fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("secret", &"[REDACTED]")
            .field("max_message_age", &self.max_message_age)
            .finish()
    }
}

/// Verifies that deliveries come from the provider.
#[derive(Debug, Clone)]
pub struct NotificationVerifier {
    config: VerifierConfig,
}

impl NotificationVerifier {
    /// Creates a verifier.
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Returns true if the delivery is authentic.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        self.check(headers, body).is_ok()
    }

    /// Verifies a delivery, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// [`ServerError::AuthenticationFailed`] if a signing header is missing
    /// or malformed, the signature does not match, or the timestamp falls
    /// outside the replay window.
    pub fn check(&self, headers: &HeaderMap, body: &[u8]) -> ServerResult<()> {
        let message_id = header(headers, MESSAGE_ID)?;
        let timestamp = header(headers, MESSAGE_TIMESTAMP)?;
        let signature = header(headers, MESSAGE_SIGNATURE)?;

        let digest = signature
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or_else(|| rejected("signature is not sha256"))?;
        let expected = hex::decode(digest).map_err(|_| rejected("signature is not hex"))?;

        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| ServerError::Internal(format!("hmac key: {e}")))?;
        mac.update(message_id.as_bytes());
        mac.update(timestamp.as_bytes());
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| rejected("signature mismatch"))?;

        self.check_timestamp(timestamp)
    }

    fn check_timestamp(&self, timestamp: &str) -> ServerResult<()> {
        let Some(max_age) = self.config.max_message_age else {
            return Ok(());
        };
        let sent = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| rejected("timestamp is not RFC 3339"))?
            .with_timezone(&Utc);
        let skew = (Utc::now() - sent).abs();
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        if skew > max_age {
            return Err(rejected("timestamp outside replay window"));
        }
        Ok(())
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> ServerResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::AuthenticationFailed(format!("missing {name} header")))
}

fn rejected(reason: &str) -> ServerError {
    ServerError::AuthenticationFailed(reason.to_string())
}
