//! Transition edge model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::transition_edges;
use crate::types::GraphScope;

/// Transition edge model representing an outcome-driven move between segments.
///
/// An edge always originates from a node in its own scope. A `NULL` target
/// marks a terminal transition (the call ends after the source segment).
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = transition_edges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransitionEdge {
    /// Unique edge identifier.
    pub id: Uuid,
    /// Flow this edge belongs to.
    pub flow_id: Uuid,
    /// Node this edge originates from.
    pub source_node_id: Uuid,
    /// Outcome name, unique among edges sharing the same source node.
    pub result_name: String,
    /// Destination node; `NULL` marks a terminal transition.
    pub target_node_id: Option<Uuid>,
    /// Graph scope column; `NULL` marks the published graph.
    pub scope: Option<Uuid>,
    /// Opaque ordering attribute for editor layout.
    pub sort_order: i32,
    /// Optional call-context key attached to the transition.
    pub context_key: Option<String>,
    /// Optional transition parameters (JSON).
    pub params: Option<serde_json::Value>,
    /// Timestamp when the edge was created.
    pub created_at: Timestamp,
    /// Timestamp when the edge was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new transition edge.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = transition_edges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTransitionEdge {
    /// Edge ID; omit to let the database generate one.
    pub id: Option<Uuid>,
    /// Flow ID (required).
    pub flow_id: Uuid,
    /// Source node (required).
    pub source_node_id: Uuid,
    /// Outcome name (required).
    pub result_name: String,
    /// Destination node.
    pub target_node_id: Option<Uuid>,
    /// Graph scope column.
    pub scope: Option<Uuid>,
    /// Ordering attribute.
    pub sort_order: Option<i32>,
    /// Call-context key.
    pub context_key: Option<String>,
    /// Transition parameters.
    pub params: Option<serde_json::Value>,
}

/// Data for updating a transition edge.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = transition_edges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateTransitionEdge {
    /// Outcome name.
    pub result_name: Option<String>,
    /// Destination node.
    pub target_node_id: Option<Option<Uuid>>,
    /// Ordering attribute.
    pub sort_order: Option<i32>,
    /// Call-context key.
    pub context_key: Option<Option<String>>,
    /// Transition parameters.
    pub params: Option<Option<serde_json::Value>>,
}

impl TransitionEdge {
    /// Returns the graph scope this edge belongs to.
    #[inline]
    pub fn graph_scope(&self) -> GraphScope {
        GraphScope::from_db(self.scope)
    }

    /// Returns whether this edge is part of the published graph.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.scope.is_none()
    }

    /// Returns whether this is a terminal transition.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.target_node_id.is_none()
    }

    /// Returns whether this edge loops back to its own source node.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.target_node_id == Some(self.source_node_id)
    }
}
