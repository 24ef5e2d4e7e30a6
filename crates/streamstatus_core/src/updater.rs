//! Status row updater.

use crate::entity::SyncEvent;
use crate::error::{CoreError, CoreResult};
use crate::marker::StatusMarker;
use std::str::FromStr;

/// What to do when the document has no row for the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsentEntityPolicy {
    /// Leave the document alone and report [`UpdateOutcome::EntityAbsent`].
    #[default]
    Ignore,
    /// Fail with [`CoreError::EntityNotFound`].
    Reject,
}

impl FromStr for AbsentEntityPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(CoreError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Result of applying a [`SyncEvent`] to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The document changed; holds the new text.
    Updated(String),
    /// The document already shows the desired state.
    NoChangeNeeded,
    /// The document has no row for the entity.
    EntityAbsent,
}

impl UpdateOutcome {
    /// Returns true if the document text changed.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Computes the new document text for `event`.
///
/// If a row in the desired state already exists for the entity (in either
/// case form) the result is [`UpdateOutcome::NoChangeNeeded`]. Otherwise the
/// first row in the opposite state is rewritten using the entity's received
/// name. Duplicate rows beyond the first are left as they are.
pub fn update(
    document: &str,
    event: &SyncEvent,
    policy: AbsentEntityPolicy,
) -> CoreResult<UpdateOutcome> {
    let entity = &event.entity;
    let target = StatusMarker::for_state(event.desired_online);
    let current = target.opposite();

    if entity
        .search_forms()
        .any(|name| document.contains(&target.row(name)))
    {
        tracing::debug!(entity = %entity, online = event.desired_online, "row already in desired state");
        return Ok(UpdateOutcome::NoChangeNeeded);
    }

    let Some(search) = entity
        .search_forms()
        .map(|name| current.row(name))
        .find(|row| document.contains(row.as_str()))
    else {
        return match policy {
            AbsentEntityPolicy::Ignore => Ok(UpdateOutcome::EntityAbsent),
            AbsentEntityPolicy::Reject => Err(CoreError::EntityNotFound {
                entity: entity.name().to_string(),
            }),
        };
    };

    tracing::debug!(entity = %entity, row = %search, "rewriting status row");
    let updated = document.replacen(&search, &target.row(entity.name()), 1);
    Ok(UpdateOutcome::Updated(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Status | Name
--- | ---
&nbsp; | `acme`
🟢 | `Zebra`
&nbsp; | `foobar`
";

    fn apply(document: &str, event: SyncEvent) -> UpdateOutcome {
        update(document, &event, AbsentEntityPolicy::Ignore).unwrap()
    }

    #[test]
    fn online_then_duplicate_is_no_change() {
        let first = apply(TABLE, SyncEvent::online("acme").unwrap());
        let UpdateOutcome::Updated(text) = first else {
            panic!("expected update, got {first:?}");
        };
        assert!(text.contains("🟢 | `acme`"));
        assert!(!text.contains("&nbsp; | `acme`"));

        let second = apply(&text, SyncEvent::online("acme").unwrap());
        assert_eq!(second, UpdateOutcome::NoChangeNeeded);
    }

    #[test]
    fn offline_round_trip_restores_text() {
        let UpdateOutcome::Updated(online) = apply(TABLE, SyncEvent::online("acme").unwrap())
        else {
            panic!("expected update");
        };
        let UpdateOutcome::Updated(offline) = apply(&online, SyncEvent::offline("acme").unwrap())
        else {
            panic!("expected update");
        };
        assert_eq!(offline, TABLE);
    }

    #[test]
    fn lowercase_row_is_found_and_original_case_written() {
        let outcome = apply(TABLE, SyncEvent::online("FooBar").unwrap());
        let UpdateOutcome::Updated(text) = outcome else {
            panic!("expected update");
        };
        assert!(text.contains("🟢 | `FooBar`"));
        assert!(!text.contains("`foobar`"));

        let outcome = apply(&text, SyncEvent::offline("FooBar").unwrap());
        let UpdateOutcome::Updated(text) = outcome else {
            panic!("expected update");
        };
        assert!(text.contains("&nbsp; | `FooBar`"));
    }

    #[test]
    fn lowercase_row_in_desired_state_is_no_change() {
        let doc = "🟢 | `foobar`\n";
        assert_eq!(
            apply(doc, SyncEvent::online("FooBar").unwrap()),
            UpdateOutcome::NoChangeNeeded
        );
        let doc = "&nbsp; | `foobar`\n";
        assert_eq!(
            apply(doc, SyncEvent::offline("FooBar").unwrap()),
            UpdateOutcome::NoChangeNeeded
        );
    }

    #[test]
    fn offline_for_online_entity() {
        let outcome = apply(TABLE, SyncEvent::offline("Zebra").unwrap());
        assert_eq!(
            outcome,
            UpdateOutcome::Updated(TABLE.replace("🟢 | `Zebra`", "&nbsp; | `Zebra`"))
        );
    }

    #[test]
    fn absent_entity_ignored() {
        let outcome = apply(TABLE, SyncEvent::online("nobody").unwrap());
        assert_eq!(outcome, UpdateOutcome::EntityAbsent);
        assert!(!outcome.is_change());
    }

    #[test]
    fn absent_entity_rejected() {
        let event = SyncEvent::online("nobody").unwrap();
        let err = update(TABLE, &event, AbsentEntityPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            CoreError::EntityNotFound {
                entity: "nobody".into()
            }
        );
    }

    #[test]
    fn only_first_duplicate_row_is_rewritten() {
        let doc = "&nbsp; | `acme`\n&nbsp; | `acme`\n";
        let outcome = apply(doc, SyncEvent::online("acme").unwrap());
        assert_eq!(
            outcome,
            UpdateOutcome::Updated("🟢 | `acme`\n&nbsp; | `acme`\n".into())
        );
    }

    #[test]
    fn prefix_names_do_not_collide() {
        let doc = "&nbsp; | `acme`\n🟢 | `acme2`\n";
        let outcome = apply(doc, SyncEvent::online("acme").unwrap());
        assert!(outcome.is_change());
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("ignore".parse(), Ok(AbsentEntityPolicy::Ignore));
        assert_eq!(" Reject ".parse(), Ok(AbsentEntityPolicy::Reject));
        assert!("insert".parse::<AbsentEntityPolicy>().is_err());
    }
}
