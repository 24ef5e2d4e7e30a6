//! Apply command implementation.

use streamstatus_core::{SyncEvent, TrackedEntity, UpdateOutcome};
use streamstatus_server::CycleOutcome;

/// Runs one sync cycle, or reports what it would do.
pub fn run(entity: &str, online: bool, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let event = SyncEvent::new(TrackedEntity::new(entity)?, online);
    let state = if online { "online" } else { "offline" };
    let sync = super::open_sync()?;

    if dry_run {
        match sync.preview(&event)? {
            UpdateOutcome::Updated(_) => {
                println!("Would mark {entity} {state}");
                println!("Commit message: {}", event.commit_message());
            }
            UpdateOutcome::NoChangeNeeded => println!("{entity} is already {state}"),
            UpdateOutcome::EntityAbsent => println!("{entity} has no row in the document"),
        }
        return Ok(());
    }

    match sync.run_cycle(&event) {
        CycleOutcome::Published { commit } => {
            println!("✓ Pushed {} {}", &commit.id[..commit.id.len().min(8)], commit.summary);
            Ok(())
        }
        CycleOutcome::NoChangeNeeded => {
            println!("{entity} is already {state}");
            Ok(())
        }
        CycleOutcome::EntityAbsent => {
            println!("{entity} has no row in the document");
            Ok(())
        }
        CycleOutcome::Aborted { stage, error } => {
            println!("✗ Sync aborted at {stage}");
            Err(error.into())
        }
    }
}
