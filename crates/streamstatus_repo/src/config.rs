//! Working copy configuration.

use crate::error::{RepoError, RepoResult};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Identity used for status commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Author and committer name.
    pub name: String,
    /// Author and committer email.
    pub email: String,
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self {
            name: "🤖 STATUSS (Seriously Totally Automated Twitch Updating StreamStatus)".into(),
            email: "goproslowyo+statuss@users.noreply.github.com".into(),
        }
    }
}

/// Configuration for the working copy.
#[derive(Clone)]
pub struct RepoConfig {
    /// Remote URL, cloned as `origin`.
    pub remote_url: String,
    /// Username for HTTPS basic auth.
    pub username: String,
    /// Access token used as the password.
    pub token: String,
    /// Parent directory of the checkout.
    pub workdir: PathBuf,
    /// Document path relative to the repository root.
    pub document_path: PathBuf,
    /// Branch to sync. Defaults to the branch HEAD points to.
    pub branch: Option<String>,
    /// Commit identity.
    pub identity: BotIdentity,
}

impl RepoConfig {
    /// Creates a configuration with default paths and identity.
    pub fn new(
        remote_url: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            remote_url: remote_url.into(),
            username: username.into(),
            token: token.into(),
            workdir: PathBuf::from("."),
            document_path: PathBuf::from("index.md"),
            branch: None,
            identity: BotIdentity::default(),
        }
    }

    /// Sets the parent directory of the checkout.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Sets the tracked document path.
    pub fn with_document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = path.into();
        self
    }

    /// Pins the branch to sync.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the commit identity.
    pub fn with_identity(mut self, identity: BotIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Directory the remote is cloned into.
    pub fn checkout_path(&self) -> RepoResult<PathBuf> {
        Ok(self.workdir.join(directory_from_url(&self.remote_url)?))
    }
}

impl fmt::Debug for RepoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoConfig")
            .field("remote_url", &self.remote_url)
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("workdir", &self.workdir)
            .field("document_path", &self.document_path)
            .field("branch", &self.branch)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Normalizes a document path to the form the git index accepts.
///
/// `./` segments are dropped. Absolute paths, `..` segments and paths that
/// name no file are rejected.
pub fn normalize_document_path(path: &Path) -> RepoResult<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(RepoError::InvalidDocumentPath(path.to_path_buf()));
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(RepoError::InvalidDocumentPath(path.to_path_buf()));
    }
    Ok(normalized)
}

/// Derives the checkout directory name from the last path segment of a
/// remote URL, without a trailing `.git`.
///
/// `https://github.com/org/site.github.io` gives `site.github.io`.
pub fn directory_from_url(url: &str) -> RepoResult<String> {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => url,
    };
    let segment = path
        .trim_end_matches('/')
        .rsplit(&['/', ':'][..])
        .next()
        .unwrap_or("");
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        return Err(RepoError::InvalidRemoteUrl(url.to_string()));
    }
    Ok(name.to_string())
}
