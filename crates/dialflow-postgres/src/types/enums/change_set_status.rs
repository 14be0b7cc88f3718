//! Change set status enumeration indicating the lifecycle state of a change set.

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Defines the lifecycle status of a change set.
///
/// This enumeration corresponds to the `CHANGE_SET_STATUS` PostgreSQL enum. Every
/// status mutation in the system goes through [`can_transition_to`], which is the
/// single table of legal lifecycle moves.
///
/// [`can_transition_to`]: ChangeSetStatus::can_transition_to
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::ChangeSetStatus"]
pub enum ChangeSetStatus {
    /// Change set is an open draft with its own editable graph scope
    #[db_rename = "draft"]
    #[serde(rename = "draft")]
    #[default]
    Draft,

    /// Draft passed structural validation and may be published
    #[db_rename = "validated"]
    #[serde(rename = "validated")]
    Validated,

    /// Change set was promoted to the live graph
    #[db_rename = "published"]
    #[serde(rename = "published")]
    Published,

    /// Draft was abandoned and its graph scope deleted
    #[db_rename = "discarded"]
    #[serde(rename = "discarded")]
    Discarded,

    /// Immutable snapshot of a formerly live graph
    #[db_rename = "archived"]
    #[serde(rename = "archived")]
    Archived,
}

impl ChangeSetStatus {
    /// Returns whether the change set is in draft status.
    #[inline]
    pub fn is_draft(self) -> bool {
        matches!(self, ChangeSetStatus::Draft)
    }

    /// Returns whether the change set has been validated.
    #[inline]
    pub fn is_validated(self) -> bool {
        matches!(self, ChangeSetStatus::Validated)
    }

    /// Returns whether the change set has been published.
    #[inline]
    pub fn is_published(self) -> bool {
        matches!(self, ChangeSetStatus::Published)
    }

    /// Returns whether the change set was discarded.
    #[inline]
    pub fn is_discarded(self) -> bool {
        matches!(self, ChangeSetStatus::Discarded)
    }

    /// Returns whether the change set is an archived snapshot.
    #[inline]
    pub fn is_archived(self) -> bool {
        matches!(self, ChangeSetStatus::Archived)
    }

    /// Returns whether the change set's graph scope is still editable.
    #[inline]
    pub fn is_editable(self) -> bool {
        matches!(self, ChangeSetStatus::Draft | ChangeSetStatus::Validated)
    }

    /// Returns whether this status is terminal.
    ///
    /// Terminal change sets never change status again. A published change set
    /// is superseded by newer change sets rather than mutated.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ChangeSetStatus::Published | ChangeSetStatus::Discarded | ChangeSetStatus::Archived
        )
    }

    /// Returns whether moving from this status to `next` is a legal
    /// lifecycle transition.
    ///
    /// Legal moves: draft to validated, draft or validated to published,
    /// draft or validated to discarded. Everything else is rejected.
    pub fn can_transition_to(self, next: ChangeSetStatus) -> bool {
        use ChangeSetStatus::*;

        match (self, next) {
            (Draft, Validated) => true,
            (Draft | Validated, Published) => true,
            (Draft | Validated, Discarded) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn draft_transitions() {
        assert!(ChangeSetStatus::Draft.can_transition_to(ChangeSetStatus::Validated));
        assert!(ChangeSetStatus::Draft.can_transition_to(ChangeSetStatus::Published));
        assert!(ChangeSetStatus::Draft.can_transition_to(ChangeSetStatus::Discarded));
        assert!(!ChangeSetStatus::Draft.can_transition_to(ChangeSetStatus::Draft));
        assert!(!ChangeSetStatus::Draft.can_transition_to(ChangeSetStatus::Archived));
    }

    #[test]
    fn validated_transitions() {
        assert!(ChangeSetStatus::Validated.can_transition_to(ChangeSetStatus::Published));
        assert!(ChangeSetStatus::Validated.can_transition_to(ChangeSetStatus::Discarded));
        assert!(!ChangeSetStatus::Validated.can_transition_to(ChangeSetStatus::Validated));
        assert!(!ChangeSetStatus::Validated.can_transition_to(ChangeSetStatus::Draft));
    }

    #[test]
    fn terminal_statuses_allow_nothing() {
        let terminal = [
            ChangeSetStatus::Published,
            ChangeSetStatus::Discarded,
            ChangeSetStatus::Archived,
        ];

        for from in terminal {
            assert!(from.is_terminal());
            for to in ChangeSetStatus::iter() {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn editable_matches_transitions() {
        for status in ChangeSetStatus::iter() {
            let can_leave = ChangeSetStatus::iter().any(|to| status.can_transition_to(to));
            assert_eq!(status.is_editable(), can_leave);
        }
    }

    #[test]
    fn serde_names_are_lowercase() {
        let json = serde_json::to_string(&ChangeSetStatus::Validated).unwrap();
        assert_eq!(json, "\"validated\"");
    }
}
