//! Change sets table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Change set table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ChangeSetConstraints {
    // Metadata validation constraints
    #[strum(serialize = "change_sets_version_name_length")]
    VersionNameLength,
    #[strum(serialize = "change_sets_description_length_max")]
    DescriptionLengthMax,

    // Lifecycle constraints
    #[strum(serialize = "change_sets_published_requires_timestamp")]
    PublishedRequiresTimestamp,

    // Chronological constraints
    #[strum(serialize = "change_sets_published_after_created")]
    PublishedAfterCreated,
    #[strum(serialize = "change_sets_updated_after_created")]
    UpdatedAfterCreated,
}

impl ChangeSetConstraints {
    /// Creates a new [`ChangeSetConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ChangeSetConstraints::VersionNameLength
            | ChangeSetConstraints::DescriptionLengthMax => ConstraintCategory::Validation,

            ChangeSetConstraints::PublishedRequiresTimestamp => ConstraintCategory::BusinessLogic,

            ChangeSetConstraints::PublishedAfterCreated
            | ChangeSetConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<ChangeSetConstraints> for String {
    #[inline]
    fn from(val: ChangeSetConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ChangeSetConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
