//! Tracked entities and sync events.

use crate::error::{CoreError, CoreResult};
use std::fmt;

/// A broadcaster tracked in the status document.
///
/// Holds the name exactly as the provider sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedEntity {
    name: String,
    lowercase: String,
}

impl TrackedEntity {
    /// Creates an entity from a received name.
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::EmptyEntity);
        }
        let lowercase = name.to_lowercase();
        Ok(Self { name, lowercase })
    }

    /// Returns the name in its received case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lowercase form of the name.
    pub fn lowercase(&self) -> &str {
        &self.lowercase
    }

    /// Returns the search forms of the name: received case first, then
    /// lowercase if it differs.
    pub fn search_forms(&self) -> impl Iterator<Item = &str> {
        let lower = (self.lowercase != self.name).then_some(self.lowercase.as_str());
        std::iter::once(self.name.as_str()).chain(lower)
    }
}

impl fmt::Display for TrackedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A requested state change for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    /// The entity to update.
    pub entity: TrackedEntity,
    /// Whether the entity should be shown online.
    pub desired_online: bool,
}

impl SyncEvent {
    /// Creates an event.
    pub fn new(entity: TrackedEntity, desired_online: bool) -> Self {
        Self {
            entity,
            desired_online,
        }
    }

    /// Creates a "went online" event.
    pub fn online(name: impl Into<String>) -> CoreResult<Self> {
        Ok(Self::new(TrackedEntity::new(name)?, true))
    }

    /// Creates a "went offline" event.
    pub fn offline(name: impl Into<String>) -> CoreResult<Self> {
        Ok(Self::new(TrackedEntity::new(name)?, false))
    }

    /// Commit message recorded for this change.
    ///
    /// The `[no ci]` tag keeps downstream CI from running on status flips.
    pub fn commit_message(&self) -> String {
        if self.desired_online {
            format!("🟢 {} has gone online! [no ci]", self.entity)
        } else {
            format!("☠️  {} has gone offline! [no ci]", self.entity)
        }
    }
}
