//! Transition edges table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Transition edge table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum TransitionEdgeConstraints {
    // Name validation constraints
    #[strum(serialize = "transition_edges_result_name_length")]
    ResultNameLength,
    #[strum(serialize = "transition_edges_context_key_length_max")]
    ContextKeyLengthMax,

    // Uniqueness constraints
    #[strum(serialize = "transition_edges_result_unique_per_source")]
    ResultUniquePerSource,

    // Referential constraints
    #[strum(serialize = "transition_edges_source_node_fkey")]
    SourceNodeFkey,
    #[strum(serialize = "transition_edges_target_node_fkey")]
    TargetNodeFkey,

    // Chronological constraints
    #[strum(serialize = "transition_edges_updated_after_created")]
    UpdatedAfterCreated,
}

impl TransitionEdgeConstraints {
    /// Creates a new [`TransitionEdgeConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            TransitionEdgeConstraints::ResultNameLength
            | TransitionEdgeConstraints::ContextKeyLengthMax => ConstraintCategory::Validation,

            TransitionEdgeConstraints::ResultUniquePerSource => ConstraintCategory::Uniqueness,

            TransitionEdgeConstraints::SourceNodeFkey
            | TransitionEdgeConstraints::TargetNodeFkey => ConstraintCategory::BusinessLogic,

            TransitionEdgeConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }

    /// Returns whether this violation indicates a dangling node reference.
    #[inline]
    pub fn is_referential(&self) -> bool {
        matches!(
            self,
            TransitionEdgeConstraints::SourceNodeFkey | TransitionEdgeConstraints::TargetNodeFkey
        )
    }
}

impl From<TransitionEdgeConstraints> for String {
    #[inline]
    fn from(val: TransitionEdgeConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for TransitionEdgeConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
