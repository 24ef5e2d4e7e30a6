//! CLI command implementations.

pub mod apply;
pub mod serve;
pub mod status;

use streamstatus_repo::GitWorkingCopy;
use streamstatus_server::{StatusSync, SyncSettings};

/// Opens the configured working copy for a one-off cycle.
fn open_sync() -> Result<StatusSync<GitWorkingCopy>, Box<dyn std::error::Error>> {
    let settings = SyncSettings::from_env()?;
    let repo = GitWorkingCopy::new(settings.repo)?;
    Ok(StatusSync::new(repo, settings.absent_policy))
}
