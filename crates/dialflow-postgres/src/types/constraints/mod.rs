//! Database constraint violations organized by table.
//!
//! This module provides a typed catalog of every named database constraint,
//! so repository callers can match on violations instead of parsing SQL
//! error strings.

mod change_sets;
mod segment_nodes;
mod transition_edges;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::change_sets::ChangeSetConstraints;
pub use self::segment_nodes::SegmentNodeConstraints;
pub use self::transition_edges::TransitionEdgeConstraints;

/// Unified constraint violation enum that can represent any database constraint.
///
/// This enum wraps all table-specific constraint types, providing a single
/// interface for handling any constraint violation while keeping the per-table
/// catalogs separately maintainable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    /// Change set lifecycle and metadata constraints.
    ChangeSet(ChangeSetConstraints),
    /// Segment node naming, config, and scope-uniqueness constraints.
    SegmentNode(SegmentNodeConstraints),
    /// Transition edge naming, uniqueness, and referential constraints.
    TransitionEdge(TransitionEdgeConstraints),
}

/// Categories of database constraint violations.
///
/// This enum helps classify constraint violations by their purpose and type,
/// making it easier to handle different categories of errors appropriately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Chronological integrity constraints (timestamp relationships).
    Chronological,
    /// Business logic constraints (domain-specific rules).
    BusinessLogic,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// This method attempts to parse a constraint name string into the
    /// corresponding enum variant. It returns `None` if the constraint name
    /// is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use dialflow_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("segment_nodes_name_unique_in_scope");
    /// assert!(violation.is_some());
    ///
    /// let unknown = ConstraintViolation::new("unknown_constraint");
    /// assert!(unknown.is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        ChangeSetConstraints::new(constraint)
            .map(Self::ChangeSet)
            .or_else(|| SegmentNodeConstraints::new(constraint).map(Self::SegmentNode))
            .or_else(|| TransitionEdgeConstraints::new(constraint).map(Self::TransitionEdge))
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::ChangeSet(_) => "change_sets",
            ConstraintViolation::SegmentNode(_) => "segment_nodes",
            ConstraintViolation::TransitionEdge(_) => "transition_edges",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::ChangeSet(c) => c.categorize(),
            ConstraintViolation::SegmentNode(c) => c.categorize(),
            ConstraintViolation::TransitionEdge(c) => c.categorize(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::ChangeSet(c) => c.fmt(f),
            ConstraintViolation::SegmentNode(c) => c.fmt(f),
            ConstraintViolation::TransitionEdge(c) => c.fmt(f),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ConstraintViolation::new(&value).ok_or(strum::ParseError::VariantNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_constraints() {
        let violation = ConstraintViolation::new("change_sets_published_after_created").unwrap();
        assert_eq!(violation.table_name(), "change_sets");
        assert_eq!(violation.categorize(), ConstraintCategory::Chronological);

        let violation = ConstraintViolation::new("segment_nodes_name_unique_in_scope").unwrap();
        assert_eq!(violation.table_name(), "segment_nodes");
        assert_eq!(violation.categorize(), ConstraintCategory::Uniqueness);

        let violation =
            ConstraintViolation::new("transition_edges_result_unique_per_source").unwrap();
        assert_eq!(violation.table_name(), "transition_edges");
        assert_eq!(violation.categorize(), ConstraintCategory::Uniqueness);
    }

    #[test]
    fn rejects_unknown_constraints() {
        assert!(ConstraintViolation::new("flows_name_unique").is_none());
        assert!(ConstraintViolation::new("").is_none());
    }

    #[test]
    fn round_trips_through_display() {
        let name = "transition_edges_source_node_fkey";
        let violation = ConstraintViolation::new(name).unwrap();
        assert_eq!(violation.to_string(), name);
    }
}
