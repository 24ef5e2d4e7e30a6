//! Error types for repository operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can occur while managing the working copy.
#[derive(Error, Debug)]
pub enum RepoError {
    /// libgit2 error.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error outside of reading the document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable directory name could be derived from the remote URL.
    #[error("cannot derive a checkout directory from remote url `{0}`")]
    InvalidRemoteUrl(String),

    /// The document path does not name a file inside the repository.
    #[error("document path `{}` must be relative and stay inside the repository", .0.display())]
    InvalidDocumentPath(PathBuf),

    /// The tracked document could not be read.
    #[error("cannot read document {}: {source}", path.display())]
    DocumentUnreadable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The remote refused a pushed ref.
    #[error("push of {refname} rejected: {message}")]
    PushRejected {
        /// Ref that was rejected.
        refname: String,
        /// Message from the remote.
        message: String,
    },

    /// The staged tree is identical to HEAD.
    #[error("nothing to commit")]
    NothingToCommit,

    /// An operation needed a working copy before one was ensured.
    #[error("working copy has not been cloned or opened")]
    NoWorkingCopy,

    /// HEAD does not point at a branch and none was configured.
    #[error("HEAD is not on a branch; configure one explicitly")]
    DetachedHead,
}

impl RepoError {
    /// Returns true if the error came from the remote (network, auth, rejection).
    pub fn is_remote(&self) -> bool {
        match self {
            RepoError::Git(e) => matches!(
                e.class(),
                git2::ErrorClass::Net | git2::ErrorClass::Http | git2::ErrorClass::Ssl
            ),
            RepoError::PushRejected { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RepoError::PushRejected {
            refname: "refs/heads/main".into(),
            message: "non-fast-forward".into(),
        };
        assert_eq!(
            err.to_string(),
            "push of refs/heads/main rejected: non-fast-forward"
        );
        assert!(err.is_remote());
        assert!(!RepoError::NoWorkingCopy.is_remote());
    }

    #[test]
    fn unreadable_document_names_path() {
        let err = RepoError::DocumentUnreadable {
            path: PathBuf::from("site/index.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("site/index.md"));
    }
}
