//! The sync cycle: make the working copy current, update one row, publish.

use crate::error::{ServerError, ServerResult};
use parking_lot::Mutex;
use std::fmt;
use streamstatus_core::{
    AbsentEntityPolicy, EntityStatus, StatusDocument, SyncEvent, TrackedEntity, UpdateOutcome,
};
use streamstatus_repo::{CommitInfo, DocumentRepository};
use tracing::{debug, error, info, warn};

/// A step of the sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Clone or force-pull.
    EnsureWorkingCopy,
    /// Read the status document.
    ReadDocument,
    /// Compute the new document text.
    UpdateStatus,
    /// Write the document back.
    WriteDocument,
    /// Stage and commit.
    Commit,
    /// Push to the remote.
    Push,
}

impl SyncStage {
    /// Stage name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnsureWorkingCopy => "ensure_working_copy",
            Self::ReadDocument => "read_document",
            Self::UpdateStatus => "update_status",
            Self::WriteDocument => "write_document",
            Self::Commit => "commit",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a sync cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The change was committed and pushed.
    Published {
        /// The status commit.
        commit: CommitInfo,
    },
    /// The document already showed the requested state.
    NoChangeNeeded,
    /// The document has no row for the entity.
    EntityAbsent,
    /// A stage failed. Earlier stages are not rolled back.
    Aborted {
        /// The failed stage.
        stage: SyncStage,
        /// Why it failed.
        error: ServerError,
    },
}

impl CycleOutcome {
    /// Returns true if the cycle failed talking to the remote rather than
    /// locally. Such failures usually clear up on the next event.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::Aborted {
                error: ServerError::Repository(e),
                ..
            } if e.is_remote()
        )
    }

    /// Returns true if a commit reached the remote.
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    /// The failed stage, if the cycle aborted.
    pub fn failed_stage(&self) -> Option<SyncStage> {
        match self {
            Self::Aborted { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Runs sync cycles. The dispatcher only sees this trait.
pub trait SyncRunner: Send + Sync {
    /// Runs one full cycle for `event`.
    fn run_cycle(&self, event: &SyncEvent) -> CycleOutcome;
}

type StageResult<T> = Result<T, (SyncStage, ServerError)>;

fn at<E: Into<ServerError>>(stage: SyncStage) -> impl FnOnce(E) -> (SyncStage, ServerError) {
    move |e| (stage, e.into())
}

/// Owns the repository handle and serializes cycles against it.
pub struct StatusSync<R> {
    repo: Mutex<R>,
    policy: AbsentEntityPolicy,
}

impl<R: DocumentRepository> StatusSync<R> {
    /// Creates an orchestrator over `repo`.
    pub fn new(repo: R, policy: AbsentEntityPolicy) -> Self {
        Self {
            repo: Mutex::new(repo),
            policy,
        }
    }

    /// The absent-entity policy in force.
    pub fn policy(&self) -> AbsentEntityPolicy {
        self.policy
    }

    /// Returns the repository handle.
    pub fn into_inner(self) -> R {
        self.repo.into_inner()
    }

    /// Runs one cycle and logs how it ended.
    pub fn run_cycle(&self, event: &SyncEvent) -> CycleOutcome {
        let mut repo = self.repo.lock();
        let outcome = match execute(&mut *repo, event, self.policy) {
            Ok(outcome) => outcome,
            Err((stage, error)) => CycleOutcome::Aborted { stage, error },
        };
        drop(repo);

        let entity = event.entity.name();
        let online = event.desired_online;
        match &outcome {
            CycleOutcome::Published { commit } => {
                info!(entity, online, commit = %commit.id, "published status change")
            }
            CycleOutcome::NoChangeNeeded => {
                info!(entity, online, "status already up to date")
            }
            CycleOutcome::EntityAbsent => {
                warn!(entity, online, "entity has no row in the status document")
            }
            CycleOutcome::Aborted { stage, error } => {
                let remote = outcome.is_remote_failure();
                error!(entity, online, %stage, remote, %error, "sync cycle aborted")
            }
        }
        outcome
    }

    /// Computes the outcome of `event` without writing anything.
    pub fn preview(&self, event: &SyncEvent) -> ServerResult<UpdateOutcome> {
        let document = self.current_document()?;
        Ok(document.apply(event, self.policy)?)
    }

    /// Reports the row state of `entity` in the current document.
    pub fn status_of(&self, entity: &TrackedEntity) -> ServerResult<EntityStatus> {
        Ok(self.current_document()?.status_of(entity))
    }

    fn current_document(&self) -> ServerResult<StatusDocument> {
        let mut repo = self.repo.lock();
        repo.ensure_working_copy()?;
        Ok(StatusDocument::new(repo.read_document()?))
    }
}

impl<R: DocumentRepository> SyncRunner for StatusSync<R> {
    fn run_cycle(&self, event: &SyncEvent) -> CycleOutcome {
        StatusSync::run_cycle(self, event)
    }
}

fn execute<R: DocumentRepository>(
    repo: &mut R,
    event: &SyncEvent,
    policy: AbsentEntityPolicy,
) -> StageResult<CycleOutcome> {
    let state = repo
        .ensure_working_copy()
        .map_err(at(SyncStage::EnsureWorkingCopy))?;
    debug!(?state, "working copy ready");

    let text = repo.read_document().map_err(at(SyncStage::ReadDocument))?;
    let updated = match streamstatus_core::update(&text, event, policy)
        .map_err(at(SyncStage::UpdateStatus))?
    {
        UpdateOutcome::Updated(updated) => updated,
        UpdateOutcome::NoChangeNeeded => return Ok(CycleOutcome::NoChangeNeeded),
        UpdateOutcome::EntityAbsent => return Ok(CycleOutcome::EntityAbsent),
    };

    repo.write_document(&updated)
        .map_err(at(SyncStage::WriteDocument))?;
    let commit = repo
        .stage_and_commit(&event.commit_message())
        .map_err(at(SyncStage::Commit))?;
    repo.push().map_err(at(SyncStage::Push))?;

    Ok(CycleOutcome::Published { commit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamstatus_core::CoreError;
    use streamstatus_repo::{RepoError, RepoResult, WorkingCopyState};
    use streamstatus_testkit::SAMPLE_DOCUMENT;

    #[derive(Default)]
    struct MemoryRepo {
        text: String,
        committed: Vec<String>,
        pushed: usize,
        ensured: usize,
        writes: usize,
        fail_at: Option<SyncStage>,
    }

    impl MemoryRepo {
        fn with_text(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Default::default()
            }
        }

        fn failing_at(mut self, stage: SyncStage) -> Self {
            self.fail_at = Some(stage);
            self
        }

        fn fail(&self, stage: SyncStage) -> RepoResult<()> {
            if self.fail_at == Some(stage) {
                return Err(RepoError::Io(std::io::Error::other(format!(
                    "{stage} failed"
                ))));
            }
            Ok(())
        }
    }

    impl DocumentRepository for MemoryRepo {
        fn ensure_working_copy(&mut self) -> RepoResult<WorkingCopyState> {
            self.fail(SyncStage::EnsureWorkingCopy)?;
            self.ensured += 1;
            Ok(WorkingCopyState::Pulled)
        }

        fn read_document(&self) -> RepoResult<String> {
            self.fail(SyncStage::ReadDocument)?;
            Ok(self.text.clone())
        }

        fn write_document(&mut self, text: &str) -> RepoResult<()> {
            self.fail(SyncStage::WriteDocument)?;
            self.writes += 1;
            self.text = text.to_string();
            Ok(())
        }

        fn stage_and_commit(&mut self, message: &str) -> RepoResult<CommitInfo> {
            self.fail(SyncStage::Commit)?;
            self.committed.push(message.to_string());
            Ok(CommitInfo {
                id: format!("{:040x}", self.committed.len()),
                summary: message.to_string(),
            })
        }

        fn push(&mut self) -> RepoResult<()> {
            self.fail(SyncStage::Push)?;
            self.pushed += 1;
            Ok(())
        }
    }

    #[test]
    fn online_event_is_published() {
        let sync = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT),
            AbsentEntityPolicy::Ignore,
        );
        let outcome = sync.run_cycle(&SyncEvent::online("acme").unwrap());
        match outcome {
            CycleOutcome::Published { commit } => {
                assert_eq!(commit.summary, "🟢 acme has gone online! [no ci]");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let repo = sync.into_inner();
        assert!(repo.text.contains("🟢 | `acme`"));
        assert!(!repo.text.contains("&nbsp; | `acme`"));
        assert_eq!(repo.pushed, 1);
    }

    #[test]
    fn unchanged_document_skips_commit_and_push() {
        let sync = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT),
            AbsentEntityPolicy::Ignore,
        );
        let outcome = sync.run_cycle(&SyncEvent::offline("acme").unwrap());
        assert!(matches!(outcome, CycleOutcome::NoChangeNeeded));

        let repo = sync.into_inner();
        assert_eq!(repo.ensured, 1);
        assert_eq!(repo.writes, 0);
        assert!(repo.committed.is_empty());
        assert_eq!(repo.pushed, 0);
    }

    #[test]
    fn absent_entity_follows_policy() {
        let event = SyncEvent::online("nobody").unwrap();

        let ignore = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT),
            AbsentEntityPolicy::Ignore,
        );
        assert!(matches!(ignore.run_cycle(&event), CycleOutcome::EntityAbsent));

        let reject = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT),
            AbsentEntityPolicy::Reject,
        );
        match reject.run_cycle(&event) {
            CycleOutcome::Aborted { stage, error } => {
                assert_eq!(stage, SyncStage::UpdateStatus);
                assert!(matches!(
                    error,
                    ServerError::Core(CoreError::EntityNotFound { .. })
                ));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(reject.into_inner().committed.is_empty());
    }

    #[test]
    fn aborts_at_first_failed_stage() {
        let event = SyncEvent::online("acme").unwrap();
        for stage in [
            SyncStage::EnsureWorkingCopy,
            SyncStage::ReadDocument,
            SyncStage::WriteDocument,
            SyncStage::Commit,
            SyncStage::Push,
        ] {
            let sync = StatusSync::new(
                MemoryRepo::with_text(SAMPLE_DOCUMENT).failing_at(stage),
                AbsentEntityPolicy::Ignore,
            );
            let outcome = sync.run_cycle(&event);
            assert_eq!(outcome.failed_stage(), Some(stage));
            assert!(!outcome.is_published());

            let repo = sync.into_inner();
            let reached_push = stage == SyncStage::Push;
            assert_eq!(repo.pushed, 0);
            assert_eq!(!repo.committed.is_empty(), reached_push);
        }
    }

    #[test]
    fn rejected_push_is_a_remote_failure() {
        struct RejectingRepo(MemoryRepo);

        impl DocumentRepository for RejectingRepo {
            fn ensure_working_copy(&mut self) -> RepoResult<WorkingCopyState> {
                self.0.ensure_working_copy()
            }
            fn read_document(&self) -> RepoResult<String> {
                self.0.read_document()
            }
            fn write_document(&mut self, text: &str) -> RepoResult<()> {
                self.0.write_document(text)
            }
            fn stage_and_commit(&mut self, message: &str) -> RepoResult<CommitInfo> {
                self.0.stage_and_commit(message)
            }
            fn push(&mut self) -> RepoResult<()> {
                Err(RepoError::PushRejected {
                    refname: "refs/heads/main".into(),
                    message: "non-fast-forward".into(),
                })
            }
        }

        let sync = StatusSync::new(
            RejectingRepo(MemoryRepo::with_text(SAMPLE_DOCUMENT)),
            AbsentEntityPolicy::Ignore,
        );
        let outcome = sync.run_cycle(&SyncEvent::online("acme").unwrap());
        assert_eq!(outcome.failed_stage(), Some(SyncStage::Push));
        assert!(outcome.is_remote_failure());

        let local = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT).failing_at(SyncStage::WriteDocument),
            AbsentEntityPolicy::Ignore,
        );
        assert!(!local.run_cycle(&SyncEvent::online("acme").unwrap()).is_remote_failure());
    }

    #[test]
    fn failed_push_is_not_rolled_back() {
        let sync = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT).failing_at(SyncStage::Push),
            AbsentEntityPolicy::Ignore,
        );
        sync.run_cycle(&SyncEvent::online("acme").unwrap());
        let repo = sync.into_inner();
        assert!(repo.text.contains("🟢 | `acme`"));
        assert_eq!(repo.committed.len(), 1);
    }

    #[test]
    fn repeated_events_publish_once() {
        let sync = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT),
            AbsentEntityPolicy::Ignore,
        );
        let event = SyncEvent::online("acme").unwrap();
        assert!(sync.run_cycle(&event).is_published());
        assert!(matches!(sync.run_cycle(&event), CycleOutcome::NoChangeNeeded));
        assert_eq!(sync.into_inner().pushed, 1);
    }

    #[test]
    fn preview_and_status_do_not_write() {
        let sync = StatusSync::new(
            MemoryRepo::with_text(SAMPLE_DOCUMENT),
            AbsentEntityPolicy::Ignore,
        );
        let acme = TrackedEntity::new("acme").unwrap();
        assert_eq!(sync.status_of(&acme).unwrap(), EntityStatus::Offline);

        let preview = sync.preview(&SyncEvent::online("acme").unwrap()).unwrap();
        assert!(preview.is_change());
        assert_eq!(sync.status_of(&acme).unwrap(), EntityStatus::Offline);

        let repo = sync.into_inner();
        assert_eq!(repo.writes, 0);
        assert_eq!(repo.ensured, 3);
    }

    #[test]
    fn stage_names() {
        assert_eq!(SyncStage::EnsureWorkingCopy.to_string(), "ensure_working_copy");
        assert_eq!(SyncStage::Push.as_str(), "push");
    }
}
