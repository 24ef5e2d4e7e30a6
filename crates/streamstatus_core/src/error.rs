//! Error types for StreamStatus core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while updating a status document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An entity name was empty.
    #[error("entity name must not be empty")]
    EmptyEntity,

    /// The document has no row for the entity and the policy rejects that.
    #[error("no status row for entity `{entity}`")]
    EntityNotFound {
        /// The entity that was searched for.
        entity: String,
    },

    /// An unknown policy name was given.
    #[error("unknown absent-entity policy `{0}` (expected `ignore` or `reject`)")]
    UnknownPolicy(String),
}
