//! # StreamStatus Protocol
//!
//! EventSub notification types and decoding for StreamStatus.
//!
//! This crate provides:
//! - Header names used by EventSub webhook deliveries
//! - Wire types for the envelope, subscription and stream events
//! - `Notification`, the decoded form the server acts on
//!
//! This is a pure protocol crate with no I/O operations. Signature
//! verification lives in the server crate, which owns the shared secret.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod headers;
mod messages;
mod notification;

pub use error::{ProtocolError, ProtocolResult};
pub use headers::{
    MessageType, MESSAGE_ID, MESSAGE_SIGNATURE, MESSAGE_TIMESTAMP, MESSAGE_TYPE,
    SIGNATURE_PREFIX, SUBSCRIPTION_TYPE,
};
pub use messages::{
    EventSubEnvelope, StreamOfflineEvent, StreamOnlineEvent, Subscription, SUBSCRIPTION_ENABLED,
    SUBSCRIPTION_PENDING, TYPE_STREAM_OFFLINE, TYPE_STREAM_ONLINE,
};
pub use notification::Notification;
