//! Turns a raw delivery into what the endpoint should answer.

use crate::auth::NotificationVerifier;
use crate::error::ServerResult;
use axum::http::HeaderMap;
use streamstatus_core::SyncEvent;
use streamstatus_protocol::{MessageType, Notification, MESSAGE_ID, MESSAGE_TYPE};
use tracing::{debug, error, info, warn};

/// What the endpoint does with a verified delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookReply {
    /// Echo the token.
    Challenge(String),
    /// Schedule a sync cycle and answer `ok`.
    Accepted(SyncEvent),
    /// Subscription revoked; acknowledge.
    Revoked,
    /// Unhandled subscription type; acknowledge.
    Ignored(String),
}

/// Verifies and decodes webhook deliveries.
#[derive(Debug, Clone)]
pub struct WebhookHandler {
    verifier: NotificationVerifier,
}

impl WebhookHandler {
    /// Creates a handler.
    pub fn new(verifier: NotificationVerifier) -> Self {
        Self { verifier }
    }

    /// Handles one delivery.
    ///
    /// Nothing is decoded unless the signature checks out.
    pub fn handle(&self, headers: &HeaderMap, body: &[u8]) -> ServerResult<WebhookReply> {
        let message_id = header_str(headers, MESSAGE_ID);
        if let Err(e) = self.verifier.check(headers, body) {
            warn!(message_id, error = %e, "rejected webhook delivery");
            return Err(e);
        }

        let message_type = header_str(headers, MESSAGE_TYPE).and_then(MessageType::parse);
        debug!(message_id, ?message_type, "verified webhook delivery");

        let notification = Notification::decode(body).map_err(|e| {
            warn!(message_id, error = %e, "undecodable webhook body");
            e
        })?;

        let reply = match notification {
            Notification::Challenge(token) => {
                info!(message_id, "answering callback verification");
                WebhookReply::Challenge(token)
            }
            Notification::StreamOnline(name) => WebhookReply::Accepted(SyncEvent::online(name)?),
            Notification::StreamOffline(name) => WebhookReply::Accepted(SyncEvent::offline(name)?),
            Notification::Revoked {
                subscription_type,
                status,
            } => {
                warn!(%subscription_type, %status, "subscription revoked");
                WebhookReply::Revoked
            }
            Notification::Unrecognized(kind) => {
                error!(subscription_type = %kind, "unrecognized subscription type");
                WebhookReply::Ignored(kind)
            }
        };

        if let WebhookReply::Accepted(event) = &reply {
            info!(
                message_id,
                entity = event.entity.name(),
                online = event.desired_online,
                "accepted status change"
            );
        }
        Ok(reply)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
