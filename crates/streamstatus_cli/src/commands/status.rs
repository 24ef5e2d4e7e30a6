//! Status command implementation.

use streamstatus_core::{EntityStatus, TrackedEntity};

/// Prints the entity's row state after refreshing the working copy.
pub fn run(entity: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracked = TrackedEntity::new(entity)?;
    let sync = super::open_sync()?;

    match sync.status_of(&tracked)? {
        EntityStatus::Online => println!("🟢 {entity} is online"),
        EntityStatus::Offline => println!("{entity} is offline"),
        EntityStatus::Absent => {
            println!("{entity} has no row in the document");
            return Err(format!("unknown entity: {entity}").into());
        }
    }
    Ok(())
}
