//! Decoded webhook notifications.

use crate::error::{ProtocolError, ProtocolResult};
use crate::messages::{
    EventSubEnvelope, StreamOfflineEvent, StreamOnlineEvent, TYPE_STREAM_OFFLINE,
    TYPE_STREAM_ONLINE,
};

/// A verified webhook body, decoded into what the server should do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Callback verification; the token must be echoed verbatim.
    Challenge(String),
    /// The broadcaster went offline.
    StreamOffline(String),
    /// The broadcaster went online.
    StreamOnline(String),
    /// The provider revoked the subscription.
    Revoked {
        /// Subscription type that was revoked.
        subscription_type: String,
        /// Revocation reason as reported by the provider.
        status: String,
    },
    /// A subscription type this service does not handle.
    Unrecognized(String),
}

impl Notification {
    /// Decodes a raw webhook body.
    ///
    /// Unknown subscription types decode to [`Notification::Unrecognized`]
    /// rather than failing. Malformed JSON and online/offline events without
    /// a broadcaster name are errors.
    pub fn decode(body: &[u8]) -> ProtocolResult<Self> {
        let envelope: EventSubEnvelope = serde_json::from_slice(body)?;

        if let Some(challenge) = envelope.challenge.filter(|c| !c.is_empty()) {
            return Ok(Self::Challenge(challenge));
        }

        let Some(subscription) = envelope.subscription else {
            return Ok(Self::Unrecognized(String::new()));
        };

        if subscription.is_revoked() && envelope.event.is_none() {
            return Ok(Self::Revoked {
                subscription_type: subscription.kind,
                status: subscription.status,
            });
        }

        let event = envelope
            .event
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        match subscription.kind.as_str() {
            TYPE_STREAM_OFFLINE => {
                let event: StreamOfflineEvent = serde_json::from_value(event)?;
                non_empty(TYPE_STREAM_OFFLINE, event.broadcaster_user_name)
                    .map(Self::StreamOffline)
            }
            TYPE_STREAM_ONLINE => {
                let event: StreamOnlineEvent = serde_json::from_value(event)?;
                non_empty(TYPE_STREAM_ONLINE, event.broadcaster_user_name)
                    .map(Self::StreamOnline)
            }
            _ => Ok(Self::Unrecognized(subscription.kind)),
        }
    }
}

fn non_empty(subscription_type: &str, name: String) -> ProtocolResult<String> {
    if name.is_empty() {
        Err(ProtocolError::missing(
            subscription_type,
            "broadcaster_user_name",
        ))
    } else {
        Ok(name)
    }
}
