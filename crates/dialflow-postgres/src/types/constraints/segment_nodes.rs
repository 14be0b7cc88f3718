//! Segment nodes table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Segment node table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum SegmentNodeConstraints {
    // Name validation constraints
    #[strum(serialize = "segment_nodes_name_length")]
    NameLength,
    #[strum(serialize = "segment_nodes_display_name_length_max")]
    DisplayNameLengthMax,

    // Configuration constraints
    #[strum(serialize = "segment_nodes_config_is_array")]
    ConfigIsArray,

    // Scope uniqueness constraints
    #[strum(serialize = "segment_nodes_name_unique_in_scope")]
    NameUniqueInScope,

    // Chronological constraints
    #[strum(serialize = "segment_nodes_updated_after_created")]
    UpdatedAfterCreated,
}

impl SegmentNodeConstraints {
    /// Creates a new [`SegmentNodeConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            SegmentNodeConstraints::NameLength
            | SegmentNodeConstraints::DisplayNameLengthMax
            | SegmentNodeConstraints::ConfigIsArray => ConstraintCategory::Validation,

            SegmentNodeConstraints::NameUniqueInScope => ConstraintCategory::Uniqueness,

            SegmentNodeConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<SegmentNodeConstraints> for String {
    #[inline]
    fn from(val: SegmentNodeConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for SegmentNodeConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
