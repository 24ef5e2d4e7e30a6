//! # StreamStatus Core
//!
//! The status document model shared by the server and the CLI.
//!
//! A status document is a markdown file with one row per tracked
//! broadcaster. A row is either online or offline:
//!
//! ```text
//! 🟢 | `acme`
//! &nbsp; | `acme`
//! ```
//!
//! The row format is a compatibility contract with documents that already
//! exist in the wild; it must round-trip exactly.
//!
//! ## Key Invariants
//!
//! - Updates are idempotent: applying the state a document already shows
//!   yields [`UpdateOutcome::NoChangeNeeded`]
//! - Rows are searched with the received name first, then its lowercase form
//! - The received (original-case) name is always the one written
//! - Only the first matching row is rewritten
//!
//! This crate performs no I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod document;
mod entity;
mod error;
mod marker;
mod updater;

pub use document::{EntityStatus, StatusDocument};
pub use entity::{SyncEvent, TrackedEntity};
pub use error::{CoreError, CoreResult};
pub use marker::{StatusMarker, OFFLINE_GLYPH, ONLINE_GLYPH};
pub use updater::{update, AbsentEntityPolicy, UpdateOutcome};
