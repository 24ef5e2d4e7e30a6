//! EventSub webhook header names.
//!
//! Names are lowercase; HTTP header lookup is case-insensitive.

/// Unique id of the delivery. Part of the signed message.
pub const MESSAGE_ID: &str = "twitch-eventsub-message-id";
/// RFC 3339 send time. Part of the signed message.
pub const MESSAGE_TIMESTAMP: &str = "twitch-eventsub-message-timestamp";
/// `sha256=<hex>` HMAC of id, timestamp and body.
pub const MESSAGE_SIGNATURE: &str = "twitch-eventsub-message-signature";
/// Kind of delivery, see [`MessageType`].
pub const MESSAGE_TYPE: &str = "twitch-eventsub-message-type";
/// Subscription type, e.g. `stream.online`.
pub const SUBSCRIPTION_TYPE: &str = "twitch-eventsub-subscription-type";

/// Prefix of the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Delivery kind carried in the message type header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// An event notification.
    Notification,
    /// Subscription ownership challenge.
    WebhookCallbackVerification,
    /// The subscription was revoked by the provider.
    Revocation,
}

impl MessageType {
    /// Parses the header value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "notification" => Some(Self::Notification),
            "webhook_callback_verification" => Some(Self::WebhookCallbackVerification),
            "revocation" => Some(Self::Revocation),
            _ => None,
        }
    }

    /// Returns the header value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::WebhookCallbackVerification => "webhook_callback_verification",
            Self::Revocation => "revocation",
        }
    }
}
