//! # StreamStatus Repository
//!
//! Owns the local working copy of the repository that holds the status
//! document.
//!
//! A cycle against the remote is:
//! 1. `ensure_working_copy` (clone, or force-pull an existing clone)
//! 2. `read_document` / `write_document`
//! 3. `stage_and_commit`
//! 4. `push`
//!
//! The force-pull discards local divergence: the remote is authoritative.
//! Callers are responsible for serializing cycles; see the server crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod git;
mod traits;

pub use config::{directory_from_url, normalize_document_path, BotIdentity, RepoConfig};
pub use error::{RepoError, RepoResult};
pub use git::GitWorkingCopy;
pub use traits::{CommitInfo, DocumentRepository, WorkingCopyState};
