//! Signed webhook deliveries.
//!
//! Signatures are computed here directly with HMAC-SHA256 so that tests
//! check the server's verifier against an independent implementation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::atomic::{AtomicU64, Ordering};
use streamstatus_protocol::{
    MessageType, MESSAGE_ID, MESSAGE_SIGNATURE, MESSAGE_TIMESTAMP, MESSAGE_TYPE,
    SIGNATURE_PREFIX, SUBSCRIPTION_TYPE,
};

type HmacSha256 = Hmac<Sha256>;

/// Secret shared by test deliveries and the server under test.
pub const TEST_SECRET: &[u8] = b"s3cre7-shared-with-the-provider";

static NEXT_MESSAGE: AtomicU64 = AtomicU64::new(1);

/// Computes the signature header value for a delivery.
pub fn sign(secret: &[u8], message_id: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message_id.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Body of a callback verification request.
pub fn challenge_body(challenge: &str) -> String {
    format!(
        r#"{{"challenge":"{challenge}","subscription":{{"id":"sub-1","status":"webhook_callback_verification_pending","type":"stream.online","version":"1","created_at":"2024-01-01T00:00:00Z"}}}}"#
    )
}

/// Body of a `stream.online` / `stream.offline` notification.
pub fn stream_body(online: bool, broadcaster: &str) -> String {
    let kind = if online { "stream.online" } else { "stream.offline" };
    let extra = if online {
        r#","id":"9001","type":"live","started_at":"2024-01-01T00:00:00Z""#
    } else {
        ""
    };
    format!(
        r#"{{"subscription":{{"id":"sub-1","status":"enabled","type":"{kind}","version":"1","created_at":"2024-01-01T00:00:00Z"}},"event":{{"broadcaster_user_id":"1337","broadcaster_user_login":"{login}","broadcaster_user_name":"{broadcaster}"{extra}}}}}"#,
        login = broadcaster.to_lowercase(),
    )
}

/// Body of a notification for an arbitrary subscription type.
pub fn typed_body(kind: &str) -> String {
    format!(
        r#"{{"subscription":{{"id":"sub-2","status":"enabled","type":"{kind}","version":"1"}},"event":{{"broadcaster_user_name":"acme"}}}}"#
    )
}

/// A webhook delivery with its signing headers.
#[derive(Debug, Clone)]
pub struct SignedDelivery {
    /// Message id header.
    pub message_id: String,
    /// Timestamp header.
    pub timestamp: String,
    /// Signature header.
    pub signature: String,
    /// Message type header.
    pub message_type: MessageType,
    /// Subscription type header, if any.
    pub subscription_type: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl SignedDelivery {
    /// Signs `body` with `secret`, timestamped now.
    pub fn new(secret: &[u8], message_type: MessageType, body: impl Into<Vec<u8>>) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true);
        Self::at(secret, message_type, body, &timestamp)
    }

    /// Signs `body` with `secret` using a fixed timestamp.
    pub fn at(
        secret: &[u8],
        message_type: MessageType,
        body: impl Into<Vec<u8>>,
        timestamp: &str,
    ) -> Self {
        let body = body.into();
        let message_id = format!(
            "test-message-{}",
            NEXT_MESSAGE.fetch_add(1, Ordering::Relaxed)
        );
        let signature = sign(secret, &message_id, timestamp, &body);
        Self {
            message_id,
            timestamp: timestamp.to_string(),
            signature,
            message_type,
            subscription_type: None,
            body,
        }
    }

    /// A signed callback verification.
    pub fn challenge(secret: &[u8], challenge: &str) -> Self {
        Self::new(
            secret,
            MessageType::WebhookCallbackVerification,
            challenge_body(challenge),
        )
    }

    /// A signed online/offline notification.
    pub fn stream(secret: &[u8], online: bool, broadcaster: &str) -> Self {
        let mut delivery = Self::new(
            secret,
            MessageType::Notification,
            stream_body(online, broadcaster),
        );
        delivery.subscription_type = Some(
            if online {
                "stream.online"
            } else {
                "stream.offline"
            }
            .to_string(),
        );
        delivery
    }

    /// Replaces the signature, e.g. to simulate tampering.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    /// Header name/value pairs for this delivery.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (MESSAGE_ID, self.message_id.clone()),
            (MESSAGE_TIMESTAMP, self.timestamp.clone()),
            (MESSAGE_SIGNATURE, self.signature.clone()),
            (MESSAGE_TYPE, self.message_type.as_str().to_string()),
        ];
        if let Some(kind) = &self.subscription_type {
            headers.push((SUBSCRIPTION_TYPE, kind.clone()));
        }
        headers
    }
}
