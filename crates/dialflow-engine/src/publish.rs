//! Publish orchestration: atomically promotes a draft scope to the live graph.
//!
//! The four steps (create the archived change set, re-tag the live graph into
//! it, clone the draft into the live scope, mark the originating change set
//! published) all run inside one transaction held by the caller. A failure in
//! any step rolls back every step; no partial archival or partial promotion
//! is ever observable.

use diesel_async::{AsyncPgConnection, RunQueryDsl};
use dialflow_postgres::model::{ChangeSet, NewChangeSet, UpdateChangeSet};
use dialflow_postgres::query::{
    ChangeSetRepository, SegmentNodeRepository, TransitionEdgeRepository,
};
use dialflow_postgres::types::{ChangeSetStatus, GraphScope};
use uuid::Uuid;

use crate::cloner::clone_graph;
use crate::{Error, Result, TRACING_TARGET_PUBLISH};

/// Serializes publishes per flow with a transaction-scoped advisory lock.
///
/// Two concurrent publishes for one flow would otherwise both re-tag the
/// `NULL` scope; the loser would archive a live graph that was already
/// replaced under it. The lock is released automatically at commit or
/// rollback.
async fn lock_flow(conn: &mut AsyncPgConnection, flow_id: Uuid) -> Result<()> {
    use diesel::sql_types::BigInt;

    let mut key = [0u8; 8];
    key.copy_from_slice(&flow_id.as_bytes()[..8]);

    diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
        .bind::<BigInt, _>(i64::from_be_bytes(key))
        .execute(conn)
        .await
        .map_err(Error::from)?;

    Ok(())
}

/// Promotes the change set's draft scope to the live graph.
///
/// Runs inside the caller's transaction. The change set must be in draft or
/// validated status; its own scope is left untouched as the permanent record
/// of what was drafted and then published.
pub(crate) async fn execute(
    conn: &mut AsyncPgConnection,
    change_set_id: Uuid,
    published_by: Uuid,
) -> Result<ChangeSet> {
    let change_set = ChangeSetRepository::find_change_set_by_id(conn, change_set_id)
        .await?
        .ok_or(Error::ChangeSetNotFound { change_set_id })?;

    lock_flow(conn, change_set.flow_id).await?;

    // Status is re-read under the flow lock so the precondition cannot be
    // invalidated by a concurrent publish of the same change set.
    let change_set = ChangeSetRepository::find_change_set_by_id(conn, change_set_id)
        .await?
        .ok_or(Error::ChangeSetNotFound { change_set_id })?;

    if !change_set.can_transition_to(ChangeSetStatus::Published) {
        return Err(Error::InvalidStateTransition {
            from: change_set.status,
            to: ChangeSetStatus::Published,
        });
    }

    // Step 1: the archived change set that will hold the retiring live graph.
    let archived = ChangeSetRepository::create_change_set(
        conn,
        NewChangeSet::archived(
            change_set.flow_id,
            change_set.project_id,
            format!("Archived by publish of change set {}", change_set.id),
        ),
    )
    .await?;

    // Step 2: re-tag the live graph into the archived scope. In-place bulk
    // update, not a copy; the retiring graph keeps its row identities.
    let nodes_archived = SegmentNodeRepository::retag_scope_nodes(
        conn,
        change_set.flow_id,
        GraphScope::Published,
        archived.scope(),
    )
    .await?;
    let edges_archived = TransitionEdgeRepository::retag_scope_edges(
        conn,
        change_set.flow_id,
        GraphScope::Published,
        archived.scope(),
    )
    .await?;

    // Step 3: clone the draft into the now-empty live scope. The draft rows
    // stay addressable under their change set id.
    let promoted = clone_graph(
        conn,
        change_set.flow_id,
        change_set.scope(),
        GraphScope::Published,
    )
    .await?;

    // Step 4: close out the originating change set.
    let published = ChangeSetRepository::update_change_set(
        conn,
        change_set.id,
        UpdateChangeSet {
            status: Some(ChangeSetStatus::Published),
            is_active: Some(false),
            published_by: Some(Some(published_by)),
            published_at: Some(Some(jiff_diesel::Timestamp::from(jiff::Timestamp::now()))),
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET_PUBLISH,
        flow_id = %published.flow_id,
        change_set_id = %published.id,
        archived_change_set_id = %archived.id,
        nodes_archived,
        edges_archived,
        nodes_promoted = promoted.nodes_copied,
        edges_promoted = promoted.edges_copied,
        "Draft published to live graph"
    );

    Ok(published)
}
