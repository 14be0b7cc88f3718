//! Segment node repository for managing the node half of the flow graph.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::model::{NewSegmentNode, SegmentNode, UpdateSegmentNode};
use crate::types::GraphScope;
use crate::{PgError, PgResult, schema};

/// Repository for segment node table operations.
///
/// All scope-wide operations (listing, re-tagging, deletion) address rows by
/// `(flow_id, scope)` and use null-safe scope comparison so the published
/// scope (`NULL`) behaves like any other scope value.
#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentNodeRepository;

impl SegmentNodeRepository {
    /// Creates a new segment node repository instance.
    pub fn new() -> Self {
        Self
    }

    /// Creates a new segment node.
    pub async fn create_segment_node(
        conn: &mut AsyncPgConnection,
        new_node: NewSegmentNode,
    ) -> PgResult<SegmentNode> {
        use schema::segment_nodes;

        diesel::insert_into(segment_nodes::table)
            .values(&new_node)
            .returning(SegmentNode::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Creates multiple segment nodes in one statement.
    ///
    /// Used by the graph cloner, which inserts a whole scope at once with
    /// pre-generated ids.
    pub async fn create_segment_nodes(
        conn: &mut AsyncPgConnection,
        new_nodes: Vec<NewSegmentNode>,
    ) -> PgResult<Vec<SegmentNode>> {
        use schema::segment_nodes;

        if new_nodes.is_empty() {
            return Ok(vec![]);
        }

        diesel::insert_into(segment_nodes::table)
            .values(&new_nodes)
            .returning(SegmentNode::as_returning())
            .get_results(conn)
            .await
            .map_err(PgError::from)
    }

    /// Finds a segment node by its ID.
    pub async fn find_segment_node_by_id(
        conn: &mut AsyncPgConnection,
        node_id: Uuid,
    ) -> PgResult<Option<SegmentNode>> {
        use schema::segment_nodes::{self, dsl};

        segment_nodes::table
            .filter(dsl::id.eq(node_id))
            .select(SegmentNode::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    /// Lists all nodes of a flow graph scope, in editor order.
    pub async fn list_scope_nodes(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> PgResult<Vec<SegmentNode>> {
        use schema::segment_nodes::{self, dsl};

        segment_nodes::table
            .filter(dsl::flow_id.eq(flow_id))
            .filter(dsl::scope.is_not_distinct_from(scope.as_db()))
            .order((dsl::sort_order.asc(), dsl::name.asc()))
            .select(SegmentNode::as_select())
            .load(conn)
            .await
            .map_err(PgError::from)
    }

    /// Updates a segment node.
    pub async fn update_segment_node(
        conn: &mut AsyncPgConnection,
        node_id: Uuid,
        updates: UpdateSegmentNode,
    ) -> PgResult<SegmentNode> {
        use schema::segment_nodes::{self, dsl};

        diesel::update(segment_nodes::table.filter(dsl::id.eq(node_id)))
            .set(&updates)
            .returning(SegmentNode::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Deletes a single segment node.
    ///
    /// Edges referencing the node are removed by the cascade on their
    /// foreign keys.
    pub async fn delete_segment_node(
        conn: &mut AsyncPgConnection,
        node_id: Uuid,
    ) -> PgResult<bool> {
        use schema::segment_nodes::{self, dsl};

        let deleted = diesel::delete(segment_nodes::table.filter(dsl::id.eq(node_id)))
            .execute(conn)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    /// Re-tags every node of one scope into another scope.
    ///
    /// This is an in-place bulk update, not a copy. Archival uses it to turn
    /// the live graph into an archived snapshot without duplicating rows.
    pub async fn retag_scope_nodes(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        from: GraphScope,
        to: GraphScope,
    ) -> PgResult<i64> {
        use schema::segment_nodes::{self, dsl};

        diesel::update(
            segment_nodes::table
                .filter(dsl::flow_id.eq(flow_id))
                .filter(dsl::scope.is_not_distinct_from(from.as_db())),
        )
        .set(dsl::scope.eq(to.as_db()))
        .execute(conn)
        .await
        .map_err(PgError::from)
        .map(|rows| rows as i64)
    }

    /// Hard-deletes every node of a scope.
    pub async fn delete_scope_nodes(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> PgResult<i64> {
        use schema::segment_nodes::{self, dsl};

        diesel::delete(
            segment_nodes::table
                .filter(dsl::flow_id.eq(flow_id))
                .filter(dsl::scope.is_not_distinct_from(scope.as_db())),
        )
        .execute(conn)
        .await
        .map_err(PgError::from)
        .map(|rows| rows as i64)
    }

    /// Counts the nodes of a scope.
    pub async fn count_scope_nodes(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> PgResult<i64> {
        use schema::segment_nodes::{self, dsl};

        segment_nodes::table
            .filter(dsl::flow_id.eq(flow_id))
            .filter(dsl::scope.is_not_distinct_from(scope.as_db()))
            .count()
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }
}
