//! Test fixtures: sample documents and a local git remote.

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Branch every fixture remote is created with.
pub const FIXTURE_BRANCH: &str = "main";

/// A small status document in the published table format.
pub const SAMPLE_DOCUMENT: &str = "\
# Streamers

Live | Name | Links
--- | --- | ---
&nbsp; | `acme` | [twitch](https://twitch.tv/acme)
🟢 | `Zebra` | [twitch](https://twitch.tv/zebra)
&nbsp; | `foobar` | [twitch](https://twitch.tv/foobar)
";

/// A bare git repository on disk acting as the `origin` remote.
///
/// Also owns a scratch directory for working copies so that everything
/// is removed when the fixture drops.
pub struct TestRemote {
    _root: TempDir,
    bare_path: PathBuf,
    workdir: PathBuf,
}

impl TestRemote {
    /// Creates a remote whose `main` branch holds one commit with `name`
    /// set to `text`. `name` must be a top-level file name.
    pub fn with_document(name: &str, text: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let bare_path = root.path().join("status.git");
        let workdir = root.path().join("work");
        std::fs::create_dir_all(&workdir).expect("Failed to create workdir");

        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).initial_head(FIXTURE_BRANCH);
        let repo = Repository::init_opts(&bare_path, &opts).expect("Failed to init bare remote");
        commit_to_branch(&repo, name, text, "Initial status");

        Self {
            _root: root,
            bare_path,
            workdir,
        }
    }

    /// URL to clone from.
    pub fn url(&self) -> String {
        self.bare_path.to_string_lossy().into_owned()
    }

    /// Parent directory for working copies of this remote.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Where a working copy of this remote lands inside [`Self::workdir`].
    pub fn checkout_path(&self) -> PathBuf {
        self.workdir.join("status")
    }

    /// Commits a new version of `name` directly on the remote branch,
    /// simulating a push from another client.
    pub fn commit_file(&self, name: &str, text: &str, message: &str) -> Oid {
        commit_to_branch(&self.open(), name, text, message)
    }

    /// Returns the content of `name` at the tip of the remote branch.
    pub fn head_file(&self, name: &str) -> Option<String> {
        let repo = self.open();
        let tree = repo
            .find_reference(&branch_ref())
            .and_then(|r| r.peel_to_tree())
            .expect("Remote branch has no tree");
        let entry = tree.get_name(name)?;
        let blob = repo.find_blob(entry.id()).expect("Tree entry is not a blob");
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Returns the message of the commit at the tip of the remote branch.
    pub fn head_message(&self) -> String {
        let repo = self.open();
        let commit = repo
            .find_reference(&branch_ref())
            .and_then(|r| r.peel_to_commit())
            .expect("Remote branch has no commit");
        commit.message().unwrap_or_default().to_string()
    }

    /// Returns the author name of the commit at the tip of the remote branch.
    pub fn head_author(&self) -> String {
        let repo = self.open();
        let commit = repo
            .find_reference(&branch_ref())
            .and_then(|r| r.peel_to_commit())
            .expect("Remote branch has no commit");
        let author = commit.author();
        author.name().unwrap_or_default().to_string()
    }

    /// Number of commits reachable from the remote branch.
    pub fn commit_count(&self) -> usize {
        let repo = self.open();
        let mut walk = repo.revwalk().expect("Failed to start revwalk");
        walk.push_ref(&branch_ref()).expect("Failed to push branch");
        walk.count()
    }

    fn open(&self) -> Repository {
        Repository::open_bare(&self.bare_path).expect("Failed to open bare remote")
    }
}

fn branch_ref() -> String {
    format!("refs/heads/{FIXTURE_BRANCH}")
}

fn commit_to_branch(repo: &Repository, name: &str, text: &str, message: &str) -> Oid {
    let signature =
        Signature::now("Fixture", "fixture@example.com").expect("Failed to build signature");
    let blob = repo.blob(text.as_bytes()).expect("Failed to write blob");

    let parent: Option<Commit<'_>> = repo
        .find_reference(&branch_ref())
        .ok()
        .and_then(|r| r.peel_to_commit().ok());
    let parent_tree = parent
        .as_ref()
        .map(|c| c.tree().expect("Parent commit has no tree"));

    let mut builder = repo
        .treebuilder(parent_tree.as_ref())
        .expect("Failed to create tree builder");
    builder
        .insert(name, blob, 0o100644)
        .expect("Failed to insert tree entry");
    let tree = repo
        .find_tree(builder.write().expect("Failed to write tree"))
        .expect("Failed to find tree");

    let parents: Vec<&Commit<'_>> = parent.iter().collect();
    repo.commit(
        Some(&branch_ref()),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .expect("Failed to commit")
}
