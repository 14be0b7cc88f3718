//! Graph scope addressing for versioned flow graphs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Addressing tag partitioning nodes and edges into independent graph snapshots.
///
/// Every segment node and transition edge belongs to exactly one scope. The
/// published scope is stored as a `NULL` column value, so "is this row live"
/// is a single comparison with no separate pointer table to keep in sync.
/// Any non-null scope is the id of the change set that owns the snapshot,
/// either an open draft or an archived graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(into = "Option<Uuid>", from = "Option<Uuid>")]
pub enum GraphScope {
    /// The currently live, published graph.
    Published,
    /// The isolated graph snapshot owned by a change set.
    ChangeSet(Uuid),
}

impl GraphScope {
    /// Creates a scope from its database column representation.
    #[inline]
    pub fn from_db(value: Option<Uuid>) -> Self {
        match value {
            None => GraphScope::Published,
            Some(id) => GraphScope::ChangeSet(id),
        }
    }

    /// Returns the database column representation of this scope.
    #[inline]
    pub fn as_db(self) -> Option<Uuid> {
        match self {
            GraphScope::Published => None,
            GraphScope::ChangeSet(id) => Some(id),
        }
    }

    /// Returns whether this is the published scope.
    #[inline]
    pub fn is_published(self) -> bool {
        matches!(self, GraphScope::Published)
    }

    /// Returns the owning change set id for non-published scopes.
    #[inline]
    pub fn change_set_id(self) -> Option<Uuid> {
        match self {
            GraphScope::Published => None,
            GraphScope::ChangeSet(id) => Some(id),
        }
    }
}

impl From<Option<Uuid>> for GraphScope {
    fn from(value: Option<Uuid>) -> Self {
        GraphScope::from_db(value)
    }
}

impl From<GraphScope> for Option<Uuid> {
    fn from(value: GraphScope) -> Self {
        value.as_db()
    }
}

impl From<Uuid> for GraphScope {
    fn from(change_set_id: Uuid) -> Self {
        GraphScope::ChangeSet(change_set_id)
    }
}

impl fmt::Display for GraphScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphScope::Published => f.write_str("published"),
            GraphScope::ChangeSet(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        let id = Uuid::new_v4();
        assert_eq!(GraphScope::from_db(None), GraphScope::Published);
        assert_eq!(GraphScope::from_db(Some(id)), GraphScope::ChangeSet(id));
        assert_eq!(GraphScope::Published.as_db(), None);
        assert_eq!(GraphScope::ChangeSet(id).as_db(), Some(id));
    }

    #[test]
    fn published_checks() {
        assert!(GraphScope::Published.is_published());
        assert!(!GraphScope::ChangeSet(Uuid::new_v4()).is_published());
        assert_eq!(GraphScope::Published.change_set_id(), None);
    }

    #[test]
    fn display() {
        assert_eq!(GraphScope::Published.to_string(), "published");

        let id = Uuid::new_v4();
        assert_eq!(GraphScope::ChangeSet(id).to_string(), id.to_string());
    }
}
