//! In-memory status document.

use crate::entity::{SyncEvent, TrackedEntity};
use crate::error::CoreResult;
use crate::marker::StatusMarker;
use crate::updater::{update, AbsentEntityPolicy, UpdateOutcome};

/// Current state of an entity's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStatus {
    /// The document shows the entity online.
    Online,
    /// The document shows the entity offline.
    Offline,
    /// The document has no row for the entity.
    Absent,
}

/// The full text of a status document for one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDocument {
    text: String,
}

impl StatusDocument {
    /// Wraps document text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the document and returns its text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Reports the entity's row state. Online wins if both rows exist.
    pub fn status_of(&self, entity: &TrackedEntity) -> EntityStatus {
        let has = |marker: StatusMarker| {
            entity
                .search_forms()
                .any(|name| self.text.contains(&marker.row(name)))
        };
        if has(StatusMarker::Online) {
            EntityStatus::Online
        } else if has(StatusMarker::Offline) {
            EntityStatus::Offline
        } else {
            EntityStatus::Absent
        }
    }

    /// Computes the outcome of `event` against this document.
    pub fn apply(&self, event: &SyncEvent, policy: AbsentEntityPolicy) -> CoreResult<UpdateOutcome> {
        update(&self.text, event, policy)
    }
}

impl From<String> for StatusDocument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
