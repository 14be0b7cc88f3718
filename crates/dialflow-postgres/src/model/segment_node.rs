//! Segment node model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::segment_nodes;
use crate::types::GraphScope;

/// Segment node model representing one step in a call-routing flow graph.
///
/// Nodes are partitioned by [`GraphScope`]: the published graph lives in the
/// `NULL` scope, while drafts and archived snapshots keep their own complete
/// copies under their change set id.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = segment_nodes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SegmentNode {
    /// Unique node identifier.
    pub id: Uuid,
    /// Flow this node belongs to.
    pub flow_id: Uuid,
    /// Node name, unique within `(flow_id, scope)`.
    pub name: String,
    /// Segment type from the reference-data dictionary.
    pub type_id: Uuid,
    /// Optional editor-facing display name.
    pub display_name: Option<String>,
    /// Graph scope column; `NULL` marks the published graph.
    pub scope: Option<Uuid>,
    /// Opaque ordering attribute for editor layout.
    pub sort_order: i32,
    /// Ordered key/value configuration entries (JSON array).
    pub config: serde_json::Value,
    /// Optional hook definitions (JSON).
    pub hooks: Option<serde_json::Value>,
    /// Timestamp when the node was created.
    pub created_at: Timestamp,
    /// Timestamp when the node was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new segment node.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = segment_nodes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSegmentNode {
    /// Node ID; omit to let the database generate one. The graph cloner
    /// pre-generates ids so it can record the old-to-new mapping.
    pub id: Option<Uuid>,
    /// Flow ID (required).
    pub flow_id: Uuid,
    /// Node name (required).
    pub name: String,
    /// Segment type (required).
    pub type_id: Uuid,
    /// Display name.
    pub display_name: Option<String>,
    /// Graph scope column.
    pub scope: Option<Uuid>,
    /// Ordering attribute.
    pub sort_order: Option<i32>,
    /// Configuration entries.
    pub config: Option<serde_json::Value>,
    /// Hook definitions.
    pub hooks: Option<serde_json::Value>,
}

/// Data for updating a segment node.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = segment_nodes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateSegmentNode {
    /// Node name.
    pub name: Option<String>,
    /// Segment type.
    pub type_id: Option<Uuid>,
    /// Display name.
    pub display_name: Option<Option<String>>,
    /// Ordering attribute.
    pub sort_order: Option<i32>,
    /// Configuration entries.
    pub config: Option<serde_json::Value>,
    /// Hook definitions.
    pub hooks: Option<Option<serde_json::Value>>,
}

impl SegmentNode {
    /// Returns the graph scope this node belongs to.
    #[inline]
    pub fn graph_scope(&self) -> GraphScope {
        GraphScope::from_db(self.scope)
    }

    /// Returns whether this node is part of the published graph.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.scope.is_none()
    }

    /// Returns the editor-facing label for this node.
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the number of configuration entries.
    pub fn config_len(&self) -> usize {
        self.config.as_array().map_or(0, |entries| entries.len())
    }

    /// Returns whether this node has hook definitions.
    pub fn has_hooks(&self) -> bool {
        self.hooks.is_some()
    }
}
