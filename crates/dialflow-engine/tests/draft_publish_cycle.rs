//! End-to-end draft/publish lifecycle tests against a live PostgreSQL.
//!
//! These tests are skipped unless `DIALFLOW_TEST_POSTGRES_URL` points at a
//! database the suite may freely write to. Each test works on its own flow
//! id, so runs never interfere with each other or with earlier data.

use std::collections::{BTreeSet, HashMap};

use dialflow_engine::mock::{MockFlowValidator, MockProjectDirectory};
use dialflow_engine::{
    ChangeSetStatus, Diagnostic, Error, FlowVersionService, GraphScope, Pagination, PgClient,
    PgConfig,
};
use dialflow_postgres::PgClientExt;
use dialflow_postgres::model::{NewSegmentNode, NewTransitionEdge, UpdateSegmentNode};
use dialflow_postgres::query::{
    SegmentNodeRepository, TransitionEdgeRepository,
};
use serde_json::json;
use uuid::Uuid;

const ENV_VAR: &str = "DIALFLOW_TEST_POSTGRES_URL";

/// Connects to the test database, applying migrations on first use.
///
/// Returns `None` (skipping the calling test) when no test database is
/// configured.
async fn test_client() -> Option<PgClient> {
    dotenvy::dotenv().ok();
    let url = std::env::var(ENV_VAR).ok()?;

    let client = PgConfig::new(url)
        .build()
        .expect("test database config must be valid");
    client
        .run_pending_migrations()
        .await
        .expect("migrations must apply");

    Some(client)
}

/// Builds a service whose directory knows the given flow.
fn service_for_flow(client: &PgClient, flow_id: Uuid) -> FlowVersionService {
    FlowVersionService::new(
        client.clone(),
        MockProjectDirectory::new()
            .with_flow(flow_id, Uuid::new_v4())
            .into_arc(),
        MockFlowValidator::accepting().into_arc(),
    )
}

/// Seeds the published scope with `menu --ok--> queue --hangup--> (end)`.
async fn seed_published_graph(client: &PgClient, flow_id: Uuid) {
    let mut conn = client.get_connection().await.unwrap();

    let menu = SegmentNodeRepository::create_segment_node(
        &mut conn,
        NewSegmentNode {
            flow_id,
            name: "menu".into(),
            type_id: Uuid::new_v4(),
            sort_order: Some(0),
            config: Some(json!([{"key": "prompt", "value": "main-menu"}])),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let queue = SegmentNodeRepository::create_segment_node(
        &mut conn,
        NewSegmentNode {
            flow_id,
            name: "queue".into(),
            type_id: Uuid::new_v4(),
            sort_order: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    TransitionEdgeRepository::create_transition_edge(
        &mut conn,
        NewTransitionEdge {
            flow_id,
            source_node_id: menu.id,
            result_name: "ok".into(),
            target_node_id: Some(queue.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    TransitionEdgeRepository::create_transition_edge(
        &mut conn,
        NewTransitionEdge {
            flow_id,
            source_node_id: queue.id,
            result_name: "hangup".into(),
            target_node_id: None,
            ..Default::default()
        },
    )
    .await
    .unwrap();
}

/// Returns the `(name, sort_order)` pairs of a scope's nodes.
async fn node_shapes(client: &PgClient, flow_id: Uuid, scope: GraphScope) -> BTreeSet<(String, i32)> {
    let mut conn = client.get_connection().await.unwrap();
    SegmentNodeRepository::list_scope_nodes(&mut conn, flow_id, scope)
        .await
        .unwrap()
        .into_iter()
        .map(|node| (node.name, node.sort_order))
        .collect()
}

/// Returns the `(source name, result, target name or None)` triples of a
/// scope's edges, with every endpoint required to resolve inside the scope.
async fn edge_shapes(
    client: &PgClient,
    flow_id: Uuid,
    scope: GraphScope,
) -> BTreeSet<(String, String, Option<String>)> {
    let mut conn = client.get_connection().await.unwrap();

    let nodes = SegmentNodeRepository::list_scope_nodes(&mut conn, flow_id, scope)
        .await
        .unwrap();
    let names: HashMap<Uuid, String> = nodes.into_iter().map(|n| (n.id, n.name)).collect();

    TransitionEdgeRepository::list_scope_edges(&mut conn, flow_id, scope)
        .await
        .unwrap()
        .into_iter()
        .map(|edge| {
            let source = names
                .get(&edge.source_node_id)
                .expect("edge source must resolve in its own scope")
                .clone();
            let target = edge.target_node_id.map(|id| {
                names
                    .get(&id)
                    .expect("edge target must resolve in its own scope")
                    .clone()
            });
            (source, edge.result_name, target)
        })
        .collect()
}

#[tokio::test]
async fn draft_resolution_is_idempotent() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;
    let service = service_for_flow(&client, flow_id);

    let first = service.get_or_create_draft(flow_id, None).await.unwrap();
    let second = service.get_or_create_draft(flow_id, None).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.status, ChangeSetStatus::Draft);

    // No duplicate clone: the draft scope still holds exactly one graph copy.
    let draft_nodes = node_shapes(&client, flow_id, first.scope()).await;
    assert_eq!(draft_nodes.len(), 2);
}

#[tokio::test]
async fn draft_clone_preserves_graph_shape() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;
    let service = service_for_flow(&client, flow_id);

    let draft = service.create_draft(flow_id, None).await.unwrap();

    let published_nodes = node_shapes(&client, flow_id, GraphScope::Published).await;
    let draft_nodes = node_shapes(&client, flow_id, draft.scope()).await;
    assert_eq!(published_nodes, draft_nodes);

    let published_edges = edge_shapes(&client, flow_id, GraphScope::Published).await;
    let draft_edges = edge_shapes(&client, flow_id, draft.scope()).await;
    assert_eq!(published_edges, draft_edges);

    // Same structure, fresh identifier space.
    let mut conn = client.get_connection().await.unwrap();
    let published_ids: BTreeSet<Uuid> =
        SegmentNodeRepository::list_scope_nodes(&mut conn, flow_id, GraphScope::Published)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
    let draft_ids: BTreeSet<Uuid> =
        SegmentNodeRepository::list_scope_nodes(&mut conn, flow_id, draft.scope())
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
    assert!(published_ids.is_disjoint(&draft_ids));
}

#[tokio::test]
async fn publish_promotes_draft_and_archives_live_graph() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;
    let service = service_for_flow(&client, flow_id);

    let original_edges = edge_shapes(&client, flow_id, GraphScope::Published).await;

    // Edit the draft: rename "menu" and add a second outcome.
    let draft = service.get_or_create_draft(flow_id, None).await.unwrap();
    {
        let mut conn = client.get_connection().await.unwrap();
        let draft_nodes =
            SegmentNodeRepository::list_scope_nodes(&mut conn, flow_id, draft.scope())
                .await
                .unwrap();
        let menu = draft_nodes.iter().find(|n| n.name == "menu").unwrap();
        let queue = draft_nodes.iter().find(|n| n.name == "queue").unwrap();

        SegmentNodeRepository::update_segment_node(
            &mut conn,
            menu.id,
            UpdateSegmentNode {
                name: Some("menu-v2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        TransitionEdgeRepository::create_transition_edge(
            &mut conn,
            NewTransitionEdge {
                flow_id,
                source_node_id: menu.id,
                result_name: "fail".into(),
                target_node_id: Some(queue.id),
                scope: draft.scope().as_db(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let draft_edges = edge_shapes(&client, flow_id, draft.scope()).await;
    let editor_id = Uuid::new_v4();
    let published = service.publish(draft.id, editor_id).await.unwrap();

    assert_eq!(published.status, ChangeSetStatus::Published);
    assert_eq!(published.published_by, Some(editor_id));
    assert!(published.published_at.is_some());
    assert!(!published.is_active);

    // Live scope now equals the draft content (edge_shapes also verifies no
    // orphan endpoints survive the promotion).
    let live_edges = edge_shapes(&client, flow_id, GraphScope::Published).await;
    assert_eq!(live_edges, draft_edges);
    let live_nodes = node_shapes(&client, flow_id, GraphScope::Published).await;
    assert!(live_nodes.iter().any(|(name, _)| name == "menu-v2"));

    // The prior live graph is fully recoverable under the archived change set.
    let change_sets = service
        .list_by_flow(flow_id, true, Pagination::default())
        .await
        .unwrap();
    let archived = change_sets
        .iter()
        .find(|cs| cs.status == ChangeSetStatus::Archived)
        .expect("publish must create an archived change set");
    let archived_edges = edge_shapes(&client, flow_id, archived.scope()).await;
    assert_eq!(archived_edges, original_edges);

    // The draft scope itself is preserved as published history.
    let retained_edges = edge_shapes(&client, flow_id, published.scope()).await;
    assert_eq!(retained_edges, draft_edges);
}

#[tokio::test]
async fn publish_rejects_terminal_statuses() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;
    let service = service_for_flow(&client, flow_id);

    let draft = service.get_or_create_draft(flow_id, None).await.unwrap();
    let editor_id = Uuid::new_v4();
    service.publish(draft.id, editor_id).await.unwrap();

    let live_before = edge_shapes(&client, flow_id, GraphScope::Published).await;

    // Publishing the same change set again must fail and change nothing.
    let err = service.publish(draft.id, editor_id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidStateTransition {
            from: ChangeSetStatus::Published,
            to: ChangeSetStatus::Published,
        }
    ));

    let live_after = edge_shapes(&client, flow_id, GraphScope::Published).await;
    assert_eq!(live_before, live_after);
}

#[tokio::test]
async fn validate_moves_draft_to_validated() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;
    let service = service_for_flow(&client, flow_id);

    let draft = service.get_or_create_draft(flow_id, None).await.unwrap();
    let validated = service.validate(draft.id).await.unwrap();
    assert_eq!(validated.status, ChangeSetStatus::Validated);

    // Validated drafts may still be published.
    let published = service.publish(draft.id, Uuid::new_v4()).await.unwrap();
    assert_eq!(published.status, ChangeSetStatus::Published);
}

#[tokio::test]
async fn validate_rejects_structurally_broken_drafts() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;

    let service = FlowVersionService::new(
        client.clone(),
        MockProjectDirectory::new()
            .with_flow(flow_id, Uuid::new_v4())
            .into_arc(),
        MockFlowValidator::reporting(vec![Diagnostic::error(None, "no terminal segment")])
            .into_arc(),
    );

    let draft = service.get_or_create_draft(flow_id, None).await.unwrap();
    let err = service.validate(draft.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidFlow { .. }));

    // The draft stays a draft and remains publishable once fixed.
    let change_sets = service
        .list_by_flow(flow_id, false, Pagination::default())
        .await
        .unwrap();
    let unchanged = change_sets.iter().find(|cs| cs.id == draft.id).unwrap();
    assert_eq!(unchanged.status, ChangeSetStatus::Draft);
}

#[tokio::test]
async fn discard_deletes_the_entire_draft_scope() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let flow_id = Uuid::new_v4();
    seed_published_graph(&client, flow_id).await;
    let service = service_for_flow(&client, flow_id);

    let draft = service.create_draft(flow_id, None).await.unwrap();
    let discarded = service.discard(draft.id).await.unwrap();
    assert_eq!(discarded.status, ChangeSetStatus::Discarded);
    assert!(!discarded.is_active);

    let mut conn = client.get_connection().await.unwrap();
    let nodes = SegmentNodeRepository::count_scope_nodes(&mut conn, flow_id, draft.scope())
        .await
        .unwrap();
    let edges = TransitionEdgeRepository::count_scope_edges(&mut conn, flow_id, draft.scope())
        .await
        .unwrap();
    assert_eq!((nodes, edges), (0, 0));

    // The published graph is untouched by the discard.
    let live_nodes = node_shapes(&client, flow_id, GraphScope::Published).await;
    assert_eq!(live_nodes.len(), 2);

    // Discard is terminal.
    let err = service.discard(draft.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn unknown_flows_and_orphaned_flows_are_rejected() {
    let Some(client) = test_client().await else {
        eprintln!("skipping: {ENV_VAR} not set");
        return;
    };

    let known = Uuid::new_v4();
    let orphaned = Uuid::new_v4();
    let service = FlowVersionService::new(
        client.clone(),
        MockProjectDirectory::new()
            .with_flow(known, Uuid::new_v4())
            .with_orphaned_flow(orphaned)
            .into_arc(),
        MockFlowValidator::accepting().into_arc(),
    );

    let err = service
        .get_or_create_draft(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FlowNotFound { .. }));

    let err = service.get_or_create_draft(orphaned, None).await.unwrap_err();
    assert!(matches!(err, Error::MissingOwnership { .. }));
}
