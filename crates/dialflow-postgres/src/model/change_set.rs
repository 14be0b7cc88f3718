//! Change set model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::change_sets;
use crate::types::{ChangeSetStatus, GraphScope};

/// Change set model representing one versioned snapshot of a flow graph.
///
/// A change set is either an open draft (its scope holds the editable copy of
/// the graph), a published record (its scope preserves what was drafted before
/// promotion), a discarded draft, or an archived snapshot of a formerly live
/// graph.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = change_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChangeSet {
    /// Unique change set identifier.
    pub id: Uuid,
    /// Flow whose graph this change set versions.
    pub flow_id: Uuid,
    /// Project that owns the flow, stamped at creation time.
    pub project_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: ChangeSetStatus,
    /// Optional editor-facing version label.
    pub version_name: Option<String>,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Whether this change set is still open for editing.
    pub is_active: bool,
    /// Account that created this change set.
    pub created_by: Option<Uuid>,
    /// Account that published this change set.
    pub published_by: Option<Uuid>,
    /// Timestamp when the change set was created.
    pub created_at: Timestamp,
    /// Timestamp when the change set was last updated.
    pub updated_at: Timestamp,
    /// Timestamp when the change set was published.
    pub published_at: Option<Timestamp>,
}

/// Data for creating a new change set.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = change_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChangeSet {
    /// Flow ID (required).
    pub flow_id: Uuid,
    /// Owning project.
    pub project_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: Option<ChangeSetStatus>,
    /// Version label.
    pub version_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Whether the change set is open for editing.
    pub is_active: Option<bool>,
    /// Creating account.
    pub created_by: Option<Uuid>,
}

/// Data for updating a change set.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = change_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateChangeSet {
    /// Lifecycle status.
    pub status: Option<ChangeSetStatus>,
    /// Version label.
    pub version_name: Option<Option<String>>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Whether the change set is open for editing.
    pub is_active: Option<bool>,
    /// Publishing account.
    pub published_by: Option<Option<Uuid>>,
    /// Publish timestamp.
    pub published_at: Option<Option<Timestamp>>,
}

impl ChangeSet {
    /// Returns the graph scope owned by this change set.
    ///
    /// Note that a change set never owns the published scope. The live graph
    /// is addressed by [`GraphScope::Published`] and is not tied to any
    /// change set id.
    #[inline]
    pub fn scope(&self) -> GraphScope {
        GraphScope::ChangeSet(self.id)
    }

    /// Returns whether the change set is an open draft.
    #[inline]
    pub fn is_draft(&self) -> bool {
        self.status.is_draft()
    }

    /// Returns whether the change set's graph scope is still editable.
    #[inline]
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Returns whether the change set has been published.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.status.is_published()
    }

    /// Returns whether the change set is an archived snapshot.
    #[inline]
    pub fn is_archived(&self) -> bool {
        self.status.is_archived()
    }

    /// Returns whether moving to `next` is a legal lifecycle transition.
    #[inline]
    pub fn can_transition_to(&self, next: ChangeSetStatus) -> bool {
        self.status.can_transition_to(next)
    }

    /// Returns the version label, or a short form of the id when unnamed.
    pub fn display_label(&self) -> String {
        match &self.version_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.id.to_string()[..8].to_string(),
        }
    }
}

impl NewChangeSet {
    /// Creates a new draft change set for a flow.
    pub fn draft(flow_id: Uuid, project_id: Option<Uuid>, created_by: Option<Uuid>) -> Self {
        Self {
            flow_id,
            project_id,
            status: Some(ChangeSetStatus::Draft),
            is_active: Some(true),
            created_by,
            ..Default::default()
        }
    }

    /// Creates an archived change set preserving a formerly live graph.
    ///
    /// Archived change sets are born in their terminal status and are closed
    /// for editing from the start.
    pub fn archived(
        flow_id: Uuid,
        project_id: Option<Uuid>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            flow_id,
            project_id,
            status: Some(ChangeSetStatus::Archived),
            description: Some(description.into()),
            is_active: Some(false),
            ..Default::default()
        }
    }
}
