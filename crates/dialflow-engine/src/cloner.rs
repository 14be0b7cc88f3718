//! Graph cloner: copies a flow graph scope into a fresh identifier space.
//!
//! Cloning is two-pass. All nodes of the source scope are copied first, with
//! pre-generated ids recorded in an old-to-new map; only then are edges
//! copied, resolving their endpoints through the map. The node pass must
//! fully complete before any edge is copied because transitions may reference
//! nodes later in iteration order or loop back to their own source, so no
//! single-pass or depth-first copy can resolve every endpoint.

use std::collections::HashMap;

use diesel_async::AsyncPgConnection;
use dialflow_postgres::model::{NewSegmentNode, NewTransitionEdge, SegmentNode, TransitionEdge};
use dialflow_postgres::query::{SegmentNodeRepository, TransitionEdgeRepository};
use dialflow_postgres::types::GraphScope;
use uuid::Uuid;

use crate::{Error, Result, TRACING_TARGET_CLONE};

/// Counts reported by a completed clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloneOutcome {
    /// Number of nodes copied into the target scope.
    pub nodes_copied: usize,
    /// Number of edges copied into the target scope.
    pub edges_copied: usize,
}

impl CloneOutcome {
    /// Returns whether the source scope was empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes_copied == 0 && self.edges_copied == 0
    }
}

/// Copies every node and edge of `source` into `target` with fresh ids.
///
/// Relational structure is preserved across the copy: each new edge points at
/// the copies of its original endpoints, and terminal edges stay terminal.
/// The caller owns transactionality; run this inside the surrounding
/// transaction so a failed clone leaves nothing behind.
///
/// # Errors
///
/// Returns [`Error::IntegrityViolation`] if an edge of the source scope
/// references a node outside that scope. Database failures abort the clone.
#[tracing::instrument(
    skip(conn),
    target = TRACING_TARGET_CLONE,
    fields(flow_id = %flow_id, source = %source, target = %target)
)]
pub async fn clone_graph(
    conn: &mut AsyncPgConnection,
    flow_id: Uuid,
    source: GraphScope,
    target: GraphScope,
) -> Result<CloneOutcome> {
    let nodes = SegmentNodeRepository::list_scope_nodes(conn, flow_id, source).await?;

    let mut id_map = HashMap::with_capacity(nodes.len());
    let new_nodes: Vec<NewSegmentNode> = nodes
        .iter()
        .map(|node| {
            let new_id = Uuid::new_v4();
            id_map.insert(node.id, new_id);
            copy_node(node, new_id, target)
        })
        .collect();

    let nodes_copied = SegmentNodeRepository::create_segment_nodes(conn, new_nodes)
        .await?
        .len();

    // Node pass is complete and the id map is full; edges can now resolve
    // self-references and forward references alike.
    let edges = TransitionEdgeRepository::list_scope_edges(conn, flow_id, source).await?;
    let new_edges = remap_edges(&edges, &id_map, source, target)?;
    let edges_copied = TransitionEdgeRepository::create_transition_edges(conn, new_edges)
        .await?
        .len();

    let outcome = CloneOutcome {
        nodes_copied,
        edges_copied,
    };

    tracing::debug!(
        target: TRACING_TARGET_CLONE,
        nodes_copied = outcome.nodes_copied,
        edges_copied = outcome.edges_copied,
        "Graph scope cloned"
    );

    Ok(outcome)
}

/// Builds the copy of one node, tagged for the target scope.
fn copy_node(node: &SegmentNode, new_id: Uuid, target: GraphScope) -> NewSegmentNode {
    NewSegmentNode {
        id: Some(new_id),
        flow_id: node.flow_id,
        name: node.name.clone(),
        type_id: node.type_id,
        display_name: node.display_name.clone(),
        scope: target.as_db(),
        sort_order: Some(node.sort_order),
        config: Some(node.config.clone()),
        hooks: node.hooks.clone(),
    }
}

/// Builds the copies of all edges, resolving endpoints through the id map.
///
/// Every edge of a scope originates from a node of that scope, so a source
/// endpoint missing from the map is an integrity fault. The same holds for
/// non-null targets; only terminal edges carry no target to resolve.
fn remap_edges(
    edges: &[TransitionEdge],
    id_map: &HashMap<Uuid, Uuid>,
    source: GraphScope,
    target: GraphScope,
) -> Result<Vec<NewTransitionEdge>> {
    edges
        .iter()
        .map(|edge| {
            let source_node_id =
                *id_map
                    .get(&edge.source_node_id)
                    .ok_or(Error::IntegrityViolation {
                        edge_id: edge.id,
                        node_id: edge.source_node_id,
                        scope: source,
                    })?;

            let target_node_id = match edge.target_node_id {
                None => None,
                Some(original) => {
                    Some(*id_map.get(&original).ok_or(Error::IntegrityViolation {
                        edge_id: edge.id,
                        node_id: original,
                        scope: source,
                    })?)
                }
            };

            Ok(NewTransitionEdge {
                id: Some(Uuid::new_v4()),
                flow_id: edge.flow_id,
                source_node_id,
                result_name: edge.result_name.clone(),
                target_node_id,
                scope: target.as_db(),
                sort_order: Some(edge.sort_order),
                context_key: edge.context_key.clone(),
                params: edge.params.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp() -> jiff_diesel::Timestamp {
        jiff_diesel::Timestamp::from(jiff::Timestamp::now())
    }

    fn node(flow_id: Uuid, name: &str) -> SegmentNode {
        SegmentNode {
            id: Uuid::new_v4(),
            flow_id,
            name: name.to_string(),
            type_id: Uuid::new_v4(),
            display_name: None,
            scope: None,
            sort_order: 0,
            config: serde_json::json!([]),
            hooks: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn edge(source: &SegmentNode, result_name: &str, target: Option<Uuid>) -> TransitionEdge {
        TransitionEdge {
            id: Uuid::new_v4(),
            flow_id: source.flow_id,
            source_node_id: source.id,
            result_name: result_name.to_string(),
            target_node_id: target,
            scope: source.scope,
            sort_order: 0,
            context_key: None,
            params: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn build_map(nodes: &[SegmentNode]) -> HashMap<Uuid, Uuid> {
        nodes.iter().map(|n| (n.id, Uuid::new_v4())).collect()
    }

    #[test]
    fn copy_node_preserves_fields() {
        let flow_id = Uuid::new_v4();
        let mut original = node(flow_id, "greeting");
        original.display_name = Some("Greeting".to_string());
        original.sort_order = 7;
        original.config = serde_json::json!([{"key": "prompt", "value": "welcome"}]);

        let new_id = Uuid::new_v4();
        let target = GraphScope::ChangeSet(Uuid::new_v4());
        let copy = copy_node(&original, new_id, target);

        assert_eq!(copy.id, Some(new_id));
        assert_eq!(copy.flow_id, flow_id);
        assert_eq!(copy.name, original.name);
        assert_eq!(copy.type_id, original.type_id);
        assert_eq!(copy.display_name, original.display_name);
        assert_eq!(copy.scope, target.as_db());
        assert_eq!(copy.sort_order, Some(7));
        assert_eq!(copy.config, Some(original.config.clone()));
    }

    #[test]
    fn remap_resolves_forward_and_terminal_edges() {
        let flow_id = Uuid::new_v4();
        let a = node(flow_id, "menu");
        let b = node(flow_id, "queue");
        let map = build_map(&[a.clone(), b.clone()]);

        // "ok" references a node copied after its source; "hangup" is terminal.
        let edges = vec![edge(&a, "ok", Some(b.id)), edge(&b, "hangup", None)];

        let target = GraphScope::ChangeSet(Uuid::new_v4());
        let remapped = remap_edges(&edges, &map, GraphScope::Published, target).unwrap();

        assert_eq!(remapped.len(), 2);
        assert_eq!(remapped[0].source_node_id, map[&a.id]);
        assert_eq!(remapped[0].target_node_id, Some(map[&b.id]));
        assert_eq!(remapped[1].source_node_id, map[&b.id]);
        assert_eq!(remapped[1].target_node_id, None);
        assert!(remapped.iter().all(|e| e.scope == target.as_db()));
    }

    #[test]
    fn remap_resolves_self_loops() {
        let flow_id = Uuid::new_v4();
        let a = node(flow_id, "retry-menu");
        let map = build_map(std::slice::from_ref(&a));

        let edges = vec![edge(&a, "invalid", Some(a.id))];
        let remapped = remap_edges(
            &edges,
            &map,
            GraphScope::Published,
            GraphScope::ChangeSet(Uuid::new_v4()),
        )
        .unwrap();

        assert_eq!(remapped[0].source_node_id, map[&a.id]);
        assert_eq!(remapped[0].target_node_id, Some(map[&a.id]));
    }

    #[test]
    fn remap_rejects_unmapped_target() {
        let flow_id = Uuid::new_v4();
        let a = node(flow_id, "menu");
        let map = build_map(std::slice::from_ref(&a));

        let outside = Uuid::new_v4();
        let edges = vec![edge(&a, "ok", Some(outside))];

        let err = remap_edges(
            &edges,
            &map,
            GraphScope::Published,
            GraphScope::ChangeSet(Uuid::new_v4()),
        )
        .unwrap_err();

        match err {
            Error::IntegrityViolation { node_id, .. } => assert_eq!(node_id, outside),
            other => panic!("expected integrity violation, got {other:?}"),
        }
    }

    #[test]
    fn remap_rejects_unmapped_source() {
        let flow_id = Uuid::new_v4();
        let a = node(flow_id, "menu");

        let edges = vec![edge(&a, "ok", None)];
        let err = remap_edges(
            &edges,
            &HashMap::new(),
            GraphScope::Published,
            GraphScope::ChangeSet(Uuid::new_v4()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::IntegrityViolation { .. }));
    }
}
