//! EventSub wire types.
//!
//! Every field is defaulted so that deliveries with extra or missing
//! members still decode; required-field checks happen in
//! [`Notification::decode`](crate::Notification::decode).

use serde::{Deserialize, Serialize};

/// Subscription type for "stream went live".
pub const TYPE_STREAM_ONLINE: &str = "stream.online";
/// Subscription type for "stream ended".
pub const TYPE_STREAM_OFFLINE: &str = "stream.offline";

/// Status of an active subscription.
pub const SUBSCRIPTION_ENABLED: &str = "enabled";
/// Status while the callback challenge is outstanding.
pub const SUBSCRIPTION_PENDING: &str = "webhook_callback_verification_pending";

/// Top-level body of every webhook delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSubEnvelope {
    /// Challenge token, present only on callback verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    /// The subscription this delivery belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    /// Event payload; its shape depends on the subscription type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<serde_json::Value>,
}

/// Subscription metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    /// Subscription id.
    pub id: String,
    /// Status, e.g. `enabled` or `authorization_revoked`.
    pub status: String,
    /// Subscription type, e.g. `stream.online`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Subscription version.
    pub version: String,
    /// Creation time as sent by the provider.
    pub created_at: String,
}

impl Subscription {
    /// Returns true if the status marks a revoked subscription.
    pub fn is_revoked(&self) -> bool {
        !self.status.is_empty()
            && self.status != SUBSCRIPTION_ENABLED
            && self.status != SUBSCRIPTION_PENDING
    }
}

/// `stream.online` event payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOnlineEvent {
    /// Stream id.
    pub id: String,
    /// Broadcaster user id.
    pub broadcaster_user_id: String,
    /// Broadcaster login (lowercase).
    pub broadcaster_user_login: String,
    /// Broadcaster display name.
    pub broadcaster_user_name: String,
    /// Stream type, e.g. `live`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Start time as sent by the provider.
    pub started_at: String,
}

/// `stream.offline` event payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOfflineEvent {
    /// Broadcaster user id.
    pub broadcaster_user_id: String,
    /// Broadcaster login (lowercase).
    pub broadcaster_user_login: String,
    /// Broadcaster display name.
    pub broadcaster_user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_ignores_unknown_members() {
        let body = r#"{
            "subscription": {
                "id": "f1c2a387",
                "type": "stream.online",
                "version": "1",
                "status": "enabled",
                "cost": 0,
                "condition": {"broadcaster_user_id": "1337"},
                "transport": {"method": "webhook", "callback": "https://example.com/webhook/callbacks"},
                "created_at": "2019-11-16T10:11:12.634234626Z"
            },
            "event": {"broadcaster_user_name": "Cool_User"}
        }"#;
        let envelope: EventSubEnvelope = serde_json::from_str(body).unwrap();
        let subscription = envelope.subscription.unwrap();
        assert_eq!(subscription.kind, TYPE_STREAM_ONLINE);
        assert!(!subscription.is_revoked());
        assert!(envelope.challenge.is_none());
    }

    #[test]
    fn online_event_fields() {
        let body = r#"{
            "id": "9001",
            "broadcaster_user_id": "1337",
            "broadcaster_user_login": "cool_user",
            "broadcaster_user_name": "Cool_User",
            "type": "live",
            "started_at": "2020-10-11T10:11:12.123Z"
        }"#;
        let event: StreamOnlineEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.broadcaster_user_name, "Cool_User");
        assert_eq!(event.broadcaster_user_login, "cool_user");
        assert_eq!(event.kind, "live");
    }

    #[test]
    fn revoked_statuses() {
        let mut subscription = Subscription {
            status: "authorization_revoked".into(),
            ..Subscription::default()
        };
        assert!(subscription.is_revoked());

        subscription.status = SUBSCRIPTION_PENDING.into();
        assert!(!subscription.is_revoked());

        subscription.status = String::new();
        assert!(!subscription.is_revoked());
    }
}
