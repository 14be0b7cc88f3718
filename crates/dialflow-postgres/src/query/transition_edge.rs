//! Transition edge repository for managing the edge half of the flow graph.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::model::{NewTransitionEdge, TransitionEdge, UpdateTransitionEdge};
use crate::types::GraphScope;
use crate::{PgError, PgResult, schema};

/// Repository for transition edge table operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransitionEdgeRepository;

impl TransitionEdgeRepository {
    /// Creates a new transition edge repository instance.
    pub fn new() -> Self {
        Self
    }

    /// Creates a new transition edge.
    pub async fn create_transition_edge(
        conn: &mut AsyncPgConnection,
        new_edge: NewTransitionEdge,
    ) -> PgResult<TransitionEdge> {
        use schema::transition_edges;

        diesel::insert_into(transition_edges::table)
            .values(&new_edge)
            .returning(TransitionEdge::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Creates multiple transition edges in one statement.
    ///
    /// Used by the graph cloner after all nodes of the target scope exist.
    pub async fn create_transition_edges(
        conn: &mut AsyncPgConnection,
        new_edges: Vec<NewTransitionEdge>,
    ) -> PgResult<Vec<TransitionEdge>> {
        use schema::transition_edges;

        if new_edges.is_empty() {
            return Ok(vec![]);
        }

        diesel::insert_into(transition_edges::table)
            .values(&new_edges)
            .returning(TransitionEdge::as_returning())
            .get_results(conn)
            .await
            .map_err(PgError::from)
    }

    /// Finds a transition edge by its ID.
    pub async fn find_transition_edge_by_id(
        conn: &mut AsyncPgConnection,
        edge_id: Uuid,
    ) -> PgResult<Option<TransitionEdge>> {
        use schema::transition_edges::{self, dsl};

        transition_edges::table
            .filter(dsl::id.eq(edge_id))
            .select(TransitionEdge::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    /// Lists all edges of a flow graph scope, in editor order.
    pub async fn list_scope_edges(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> PgResult<Vec<TransitionEdge>> {
        use schema::transition_edges::{self, dsl};

        transition_edges::table
            .filter(dsl::flow_id.eq(flow_id))
            .filter(dsl::scope.is_not_distinct_from(scope.as_db()))
            .order((dsl::sort_order.asc(), dsl::result_name.asc()))
            .select(TransitionEdge::as_select())
            .load(conn)
            .await
            .map_err(PgError::from)
    }

    /// Lists the outgoing edges of a segment node, in editor order.
    pub async fn list_source_edges(
        conn: &mut AsyncPgConnection,
        source_node_id: Uuid,
    ) -> PgResult<Vec<TransitionEdge>> {
        use schema::transition_edges::{self, dsl};

        transition_edges::table
            .filter(dsl::source_node_id.eq(source_node_id))
            .order((dsl::sort_order.asc(), dsl::result_name.asc()))
            .select(TransitionEdge::as_select())
            .load(conn)
            .await
            .map_err(PgError::from)
    }

    /// Updates a transition edge.
    pub async fn update_transition_edge(
        conn: &mut AsyncPgConnection,
        edge_id: Uuid,
        updates: UpdateTransitionEdge,
    ) -> PgResult<TransitionEdge> {
        use schema::transition_edges::{self, dsl};

        diesel::update(transition_edges::table.filter(dsl::id.eq(edge_id)))
            .set(&updates)
            .returning(TransitionEdge::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Deletes a single transition edge.
    pub async fn delete_transition_edge(
        conn: &mut AsyncPgConnection,
        edge_id: Uuid,
    ) -> PgResult<bool> {
        use schema::transition_edges::{self, dsl};

        let deleted = diesel::delete(transition_edges::table.filter(dsl::id.eq(edge_id)))
            .execute(conn)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    /// Re-tags every edge of one scope into another scope.
    ///
    /// This is an in-place bulk update, not a copy, used together with
    /// [`SegmentNodeRepository::retag_scope_nodes`] so nodes and edges of a
    /// snapshot always move scope together.
    ///
    /// [`SegmentNodeRepository::retag_scope_nodes`]: crate::query::SegmentNodeRepository::retag_scope_nodes
    pub async fn retag_scope_edges(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        from: GraphScope,
        to: GraphScope,
    ) -> PgResult<i64> {
        use schema::transition_edges::{self, dsl};

        diesel::update(
            transition_edges::table
                .filter(dsl::flow_id.eq(flow_id))
                .filter(dsl::scope.is_not_distinct_from(from.as_db())),
        )
        .set(dsl::scope.eq(to.as_db()))
        .execute(conn)
        .await
        .map_err(PgError::from)
        .map(|rows| rows as i64)
    }

    /// Hard-deletes every edge of a scope.
    ///
    /// Run before [`delete_scope_nodes`] so no edge ever outlives its
    /// endpoints.
    ///
    /// [`delete_scope_nodes`]: crate::query::SegmentNodeRepository::delete_scope_nodes
    pub async fn delete_scope_edges(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> PgResult<i64> {
        use schema::transition_edges::{self, dsl};

        diesel::delete(
            transition_edges::table
                .filter(dsl::flow_id.eq(flow_id))
                .filter(dsl::scope.is_not_distinct_from(scope.as_db())),
        )
        .execute(conn)
        .await
        .map_err(PgError::from)
        .map(|rows| rows as i64)
    }

    /// Counts the edges of a scope.
    pub async fn count_scope_edges(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> PgResult<i64> {
        use schema::transition_edges::{self, dsl};

        transition_edges::table
            .filter(dsl::flow_id.eq(flow_id))
            .filter(dsl::scope.is_not_distinct_from(scope.as_db()))
            .count()
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }
}
