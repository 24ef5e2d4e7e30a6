//! # StreamStatus Server
//!
//! Receives EventSub webhook deliveries and mirrors stream online/offline
//! changes into a status document kept in git.
//!
//! This crate provides:
//! - HTTP endpoints (`POST /webhook/callbacks`, `GET /healthz`)
//! - Signature verification (HMAC-SHA256 over id, timestamp and body)
//! - The sync cycle (pull, update, commit, push) with typed stage failures
//! - Serialized dispatch of accepted events off the request path
//!
//! # Request Flow
//!
//! 1. Deliveries with a bad signature get `403` and an empty body
//! 2. Callback verifications get the challenge token echoed back
//! 3. Stream changes get `200 ok` at once; the sync runs afterwards
//! 4. Revocations and unknown types get an empty `200`
//!
//! # Configuration
//!
//! ```rust,ignore
//! use streamstatus_server::{ServerConfig, WebhookServer};
//!
//! // SS_USERNAME, SS_TOKEN and SS_SECRETKEY are required
//! let config = ServerConfig::from_env()?;
//! WebhookServer::new(config)?.serve().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod dispatch;
mod error;
mod handler;
mod router;
mod server;
mod sync;

pub use auth::{NotificationVerifier, VerifierConfig};
pub use config::{
    ServerConfig, SyncSettings, DEFAULT_MAX_MESSAGE_AGE, DEFAULT_PORT, DEFAULT_REPO_URL,
};
pub use dispatch::{DispatchMode, SyncDispatcher, DEFAULT_QUEUE_CAPACITY};
pub use error::{ServerError, ServerResult};
pub use handler::{WebhookHandler, WebhookReply};
pub use router::{webhook_router, AppState, CALLBACK_PATH, HEALTH_PATH};
pub use server::WebhookServer;
pub use sync::{CycleOutcome, StatusSync, SyncRunner, SyncStage};
