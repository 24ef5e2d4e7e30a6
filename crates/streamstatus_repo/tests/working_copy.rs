//! Integration tests for the git working copy against a local bare remote.

use streamstatus_repo::{
    DocumentRepository, GitWorkingCopy, RepoConfig, RepoError, WorkingCopyState,
};
use streamstatus_testkit::{TestRemote, SAMPLE_DOCUMENT};

fn working_copy(remote: &TestRemote) -> GitWorkingCopy {
    let config = RepoConfig::new(remote.url(), "bot", "token").with_workdir(remote.workdir());
    GitWorkingCopy::new(config).unwrap()
}

#[test]
fn first_ensure_clones() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);

    assert_eq!(copy.ensure_working_copy().unwrap(), WorkingCopyState::Cloned);
    assert_eq!(copy.local_path(), remote.checkout_path());
    assert_eq!(copy.read_document().unwrap(), SAMPLE_DOCUMENT);
}

#[test]
fn second_ensure_pulls_existing_clone() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);
    copy.ensure_working_copy().unwrap();

    remote.commit_file("index.md", "updated elsewhere\n", "Remote edit");

    assert_eq!(copy.ensure_working_copy().unwrap(), WorkingCopyState::Pulled);
    assert_eq!(copy.read_document().unwrap(), "updated elsewhere\n");
}

#[test]
fn existing_clone_is_reused_by_a_new_handle() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    working_copy(&remote).ensure_working_copy().unwrap();

    let mut restarted = working_copy(&remote);
    assert_eq!(
        restarted.ensure_working_copy().unwrap(),
        WorkingCopyState::Pulled
    );
    assert_eq!(restarted.read_document().unwrap(), SAMPLE_DOCUMENT);
}

#[test]
fn forced_pull_discards_local_divergence() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);
    copy.ensure_working_copy().unwrap();

    // Unpushed local commit plus an uncommitted edit.
    copy.write_document("local commit\n").unwrap();
    copy.stage_and_commit("Local only").unwrap();
    copy.write_document("dirty edit\n").unwrap();

    assert_eq!(copy.ensure_working_copy().unwrap(), WorkingCopyState::Pulled);
    assert_eq!(copy.read_document().unwrap(), SAMPLE_DOCUMENT);
}

#[test]
fn commit_and_push_reach_the_remote() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);
    copy.ensure_working_copy().unwrap();

    let text = SAMPLE_DOCUMENT.replace("&nbsp; | `acme`", "🟢 | `acme`");
    copy.write_document(&text).unwrap();
    let commit = copy
        .stage_and_commit("🟢 acme has gone online! [no ci]")
        .unwrap();
    assert_eq!(commit.summary, "🟢 acme has gone online! [no ci]");
    assert_eq!(commit.id.len(), 40);

    copy.push().unwrap();

    assert_eq!(remote.head_file("index.md").as_deref(), Some(text.as_str()));
    assert_eq!(remote.head_message(), "🟢 acme has gone online! [no ci]");
    assert!(remote.head_author().contains("STATUSS"));
    assert_eq!(remote.commit_count(), 2);
}

#[test]
fn commit_without_changes_is_refused() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);
    copy.ensure_working_copy().unwrap();

    let err = copy.stage_and_commit("noop").unwrap_err();
    assert!(matches!(err, RepoError::NothingToCommit));
}

#[test]
fn operations_before_ensure_fail() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);

    assert!(matches!(
        copy.stage_and_commit("x"),
        Err(RepoError::NoWorkingCopy)
    ));
    assert!(matches!(copy.push(), Err(RepoError::NoWorkingCopy)));
}

#[test]
fn missing_document_is_unreadable() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let config = RepoConfig::new(remote.url(), "bot", "token")
        .with_workdir(remote.workdir())
        .with_document_path("README.md");
    let mut copy = GitWorkingCopy::new(config).unwrap();
    copy.ensure_working_copy().unwrap();

    assert!(matches!(
        copy.read_document(),
        Err(RepoError::DocumentUnreadable { .. })
    ));
}

#[test]
fn non_repository_directory_fails() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    std::fs::create_dir_all(remote.checkout_path()).unwrap();
    std::fs::write(remote.checkout_path().join("stray.txt"), "not a repo").unwrap();

    let mut copy = working_copy(&remote);
    assert!(copy.ensure_working_copy().is_err());
}

#[test]
fn unreachable_remote_fails() {
    let workdir = tempfile::TempDir::new().unwrap();
    let missing = workdir.path().join("nowhere").join("status.git");
    let config = RepoConfig::new(missing.to_string_lossy(), "bot", "token")
        .with_workdir(workdir.path());
    let mut copy = GitWorkingCopy::new(config).unwrap();

    assert!(matches!(
        copy.ensure_working_copy(),
        Err(RepoError::Git(_))
    ));
}

#[test]
fn pinned_branch_is_used() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let config = RepoConfig::new(remote.url(), "bot", "token")
        .with_workdir(remote.workdir())
        .with_branch("main");
    let mut copy = GitWorkingCopy::new(config).unwrap();
    copy.ensure_working_copy().unwrap();
    assert_eq!(copy.ensure_working_copy().unwrap(), WorkingCopyState::Pulled);

    copy.write_document("pinned\n").unwrap();
    copy.stage_and_commit("pinned").unwrap();
    copy.push().unwrap();
    assert_eq!(remote.head_file("index.md").as_deref(), Some("pinned\n"));
}

#[test]
fn diverged_push_is_rejected_and_remote_kept() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let mut copy = working_copy(&remote);
    copy.ensure_working_copy().unwrap();

    remote.commit_file("index.md", "pushed by someone else\n", "Remote edit");
    copy.write_document("local edit\n").unwrap();
    copy.stage_and_commit("Local edit").unwrap();

    let err = copy.push().unwrap_err();
    assert!(matches!(err, RepoError::PushRejected { .. }), "{err}");
    assert!(err.is_remote());
    assert_eq!(remote.head_message(), "Remote edit");
    assert_eq!(
        remote.head_file("index.md").as_deref(),
        Some("pushed by someone else\n")
    );
}

#[test]
fn dotted_document_path_commits() {
    let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
    let config = RepoConfig::new(remote.url(), "bot", "token")
        .with_workdir(remote.workdir())
        .with_document_path("./index.md");
    let mut copy = GitWorkingCopy::new(config).unwrap();
    assert_eq!(copy.config().document_path, std::path::PathBuf::from("index.md"));
    copy.ensure_working_copy().unwrap();

    copy.write_document("dotted\n").unwrap();
    copy.stage_and_commit("dotted").unwrap();
    copy.push().unwrap();
    assert_eq!(remote.head_file("index.md").as_deref(), Some("dotted\n"));
}

#[test]
fn escaping_document_path_is_refused() {
    for bad in ["../index.md", "/tmp/index.md"] {
        let config = RepoConfig::new("https://example.com/org/status", "bot", "token")
            .with_document_path(bad);
        assert!(matches!(
            GitWorkingCopy::new(config),
            Err(RepoError::InvalidDocumentPath(_))
        ));
    }
}
