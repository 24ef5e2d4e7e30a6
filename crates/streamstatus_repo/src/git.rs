//! git2-backed working copy.

use crate::config::{normalize_document_path, RepoConfig};
use crate::error::{RepoError, RepoResult};
use crate::traits::{CommitInfo, DocumentRepository, WorkingCopyState};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Commit, Cred, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks, Repository, ResetType,
    Signature,
};
use std::path::PathBuf;

const ORIGIN: &str = "origin";

/// The local clone of the status repository.
pub struct GitWorkingCopy {
    config: RepoConfig,
    local_path: PathBuf,
    repo: Option<Repository>,
}

impl GitWorkingCopy {
    /// Creates a handle. Nothing touches the disk until
    /// [`DocumentRepository::ensure_working_copy`] runs.
    ///
    /// The document path is normalized; see [`normalize_document_path`].
    pub fn new(mut config: RepoConfig) -> RepoResult<Self> {
        let local_path = config.checkout_path()?;
        config.document_path = normalize_document_path(&config.document_path)?;
        Ok(Self {
            config,
            local_path,
            repo: None,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Directory the repository is checked out in.
    pub fn local_path(&self) -> &std::path::Path {
        &self.local_path
    }

    /// Absolute path of the tracked document.
    pub fn document_file(&self) -> PathBuf {
        self.local_path.join(&self.config.document_path)
    }

    fn repo(&self) -> RepoResult<&Repository> {
        self.repo.as_ref().ok_or(RepoError::NoWorkingCopy)
    }

    /// Branch being synced: the configured one, else HEAD's.
    fn branch_name(&self, repo: &Repository) -> RepoResult<String> {
        if let Some(branch) = &self.config.branch {
            return Ok(branch.clone());
        }
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(RepoError::DetachedHead);
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or(RepoError::DetachedHead)
    }

    /// Remote callbacks carrying the basic-auth credentials.
    ///
    /// libgit2 re-invokes the credential callback after a rejection, so a
    /// second request fails instead of looping.
    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let username = &self.config.username;
        let token = &self.config.token;
        let mut attempts = 0u32;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, _username_from_url, _allowed| {
            attempts += 1;
            if attempts > 1 {
                return Err(git2::Error::from_str("remote rejected credentials"));
            }
            Cred::userpass_plaintext(username, token)
        });
        callbacks
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut options = FetchOptions::new();
        options.remote_callbacks(self.callbacks());
        options
    }

    fn clone_fresh(&self) -> Result<Repository, git2::Error> {
        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        if let Some(branch) = &self.config.branch {
            builder.branch(branch);
        }
        builder.clone(&self.config.remote_url, &self.local_path)
    }

    /// Fetches the branch from `origin` and hard-resets the checkout to it.
    fn force_pull(&self, repo: &Repository) -> RepoResult<()> {
        let branch = self.branch_name(repo)?;
        let remote_ref = format!("refs/remotes/{ORIGIN}/{branch}");
        let refspec = format!("+refs/heads/{branch}:{remote_ref}");

        let mut remote = repo.find_remote(ORIGIN)?;
        remote.fetch(&[refspec.as_str()], Some(&mut self.fetch_options()), None)?;

        let fetched = repo.find_reference(&remote_ref)?.peel_to_commit()?;
        let local_ref = format!("refs/heads/{branch}");
        if repo.find_reference(&local_ref).is_err() {
            repo.branch(&branch, &fetched, false)?;
        }
        repo.set_head(&local_ref)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        repo.reset(fetched.as_object(), ResetType::Hard, Some(&mut checkout))?;

        tracing::debug!(branch = %branch, commit = %fetched.id(), "working copy reset to remote");
        Ok(())
    }
}

impl DocumentRepository for GitWorkingCopy {
    fn ensure_working_copy(&mut self) -> RepoResult<WorkingCopyState> {
        match self.clone_fresh() {
            Ok(repo) => {
                tracing::info!(path = %self.local_path.display(), "cloned status repository");
                self.repo = Some(repo);
                Ok(WorkingCopyState::Cloned)
            }
            Err(e) if e.code() == ErrorCode::Exists => {
                tracing::warn!(path = %self.local_path.display(), "working copy exists, doing forced pull");
                let repo = Repository::open(&self.local_path)?;
                self.force_pull(&repo)?;
                self.repo = Some(repo);
                Ok(WorkingCopyState::Pulled)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_document(&self) -> RepoResult<String> {
        let path = self.document_file();
        std::fs::read_to_string(&path).map_err(|source| RepoError::DocumentUnreadable { path, source })
    }

    fn write_document(&mut self, text: &str) -> RepoResult<()> {
        std::fs::write(self.document_file(), text)?;
        Ok(())
    }

    fn stage_and_commit(&mut self, message: &str) -> RepoResult<CommitInfo> {
        let repo = self.repo()?;

        let mut index = repo.index()?;
        index.add_path(&self.config.document_path)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let parent: Option<Commit<'_>> = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        if let Some(parent) = &parent {
            if parent.tree_id() == tree.id() {
                return Err(RepoError::NothingToCommit);
            }
        }

        let identity = &self.config.identity;
        let signature = Signature::now(&identity.name, &identity.email)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let id = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        let commit = repo.find_commit(id)?;
        let info = CommitInfo {
            id: id.to_string(),
            summary: commit.summary().unwrap_or_default().to_string(),
        };
        tracing::info!(commit = %info.id, summary = %info.summary, "committed status change");
        Ok(info)
    }

    fn push(&mut self) -> RepoResult<()> {
        let repo = self.repo()?;
        let branch = self.branch_name(repo)?;
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        let mut remote = repo.find_remote(ORIGIN)?;

        let mut rejected: Option<(String, String)> = None;
        {
            let mut callbacks = self.callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejected = Some((refname.to_string(), message.to_string()));
                }
                Ok(())
            });
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| match e.code() {
                    ErrorCode::NotFastForward => RepoError::PushRejected {
                        refname: format!("refs/heads/{branch}"),
                        message: e.message().to_string(),
                    },
                    _ => RepoError::Git(e),
                })?;
        }

        if let Some((refname, message)) = rejected {
            return Err(RepoError::PushRejected { refname, message });
        }
        tracing::info!(branch = %branch, remote = %self.config.remote_url, "remote repo updated");
        Ok(())
    }
}
