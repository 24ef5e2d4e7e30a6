//! Repository abstraction used by the sync orchestrator.

use crate::error::RepoResult;

/// How [`DocumentRepository::ensure_working_copy`] obtained the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingCopyState {
    /// A fresh clone was made.
    Cloned,
    /// An existing checkout was reset to the remote branch.
    Pulled,
}

/// A commit created by [`DocumentRepository::stage_and_commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit id (hex).
    pub id: String,
    /// First line of the commit message.
    pub summary: String,
}

/// A versioned store for the status document.
///
/// Implement this trait to back the orchestrator with something other than
/// a git working copy (tests use an in-memory implementation).
pub trait DocumentRepository: Send {
    /// Makes the local copy current with the remote.
    fn ensure_working_copy(&mut self) -> RepoResult<WorkingCopyState>;

    /// Reads the tracked document.
    fn read_document(&self) -> RepoResult<String>;

    /// Overwrites the tracked document.
    fn write_document(&mut self, text: &str) -> RepoResult<()>;

    /// Stages the tracked document and commits it.
    fn stage_and_commit(&mut self, message: &str) -> RepoResult<CommitInfo>;

    /// Pushes the current branch to `origin`.
    fn push(&mut self) -> RepoResult<()>;
}
