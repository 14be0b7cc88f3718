//! Discard/cleanup: permanently removes an abandoned draft's graph scope.

use diesel_async::AsyncPgConnection;
use dialflow_postgres::model::{ChangeSet, UpdateChangeSet};
use dialflow_postgres::query::{
    ChangeSetRepository, SegmentNodeRepository, TransitionEdgeRepository,
};
use dialflow_postgres::types::ChangeSetStatus;
use uuid::Uuid;

use crate::{Error, Result, TRACING_TARGET_DISCARD};

/// Hard-deletes the change set's graph scope and marks it discarded.
///
/// Runs inside the caller's transaction. Abandoned drafts have no retained
/// value, so unlike archival this is a real delete and is irreversible.
/// Edges go first so no edge ever outlives its endpoints.
pub(crate) async fn execute(
    conn: &mut AsyncPgConnection,
    change_set_id: Uuid,
) -> Result<ChangeSet> {
    let change_set = ChangeSetRepository::find_change_set_by_id(conn, change_set_id)
        .await?
        .ok_or(Error::ChangeSetNotFound { change_set_id })?;

    if !change_set.can_transition_to(ChangeSetStatus::Discarded) {
        return Err(Error::InvalidStateTransition {
            from: change_set.status,
            to: ChangeSetStatus::Discarded,
        });
    }

    let edges_deleted = TransitionEdgeRepository::delete_scope_edges(
        conn,
        change_set.flow_id,
        change_set.scope(),
    )
    .await?;
    let nodes_deleted =
        SegmentNodeRepository::delete_scope_nodes(conn, change_set.flow_id, change_set.scope())
            .await?;

    let discarded = ChangeSetRepository::update_change_set(
        conn,
        change_set.id,
        UpdateChangeSet {
            status: Some(ChangeSetStatus::Discarded),
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET_DISCARD,
        flow_id = %discarded.flow_id,
        change_set_id = %discarded.id,
        nodes_deleted,
        edges_deleted,
        "Draft discarded and graph scope deleted"
    );

    Ok(discarded)
}
