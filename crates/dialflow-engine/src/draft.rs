//! Draft resolution: finds or creates the isolated editing copy of a flow.
//!
//! A draft is created by cloning the entire published graph into the new
//! change set's scope up front. Edits are then ordinary writes against an
//! isolated scope, so no copy-on-write or merge machinery is needed anywhere
//! else in the system.

use diesel_async::AsyncPgConnection;
use dialflow_postgres::model::{ChangeSet, NewChangeSet};
use dialflow_postgres::query::ChangeSetRepository;
use dialflow_postgres::types::GraphScope;
use uuid::Uuid;

use crate::cloner::clone_graph;
use crate::collab::FlowOwnership;
use crate::{Result, TRACING_TARGET_DRAFT};

/// Creates a new draft change set and clones the live graph into its scope.
///
/// Runs inside the caller's transaction. Every call creates a fresh draft;
/// concurrent drafts for one flow are permitted and fully isolated from each
/// other.
pub(crate) async fn create(
    conn: &mut AsyncPgConnection,
    ownership: FlowOwnership,
    created_by: Option<Uuid>,
) -> Result<ChangeSet> {
    let new_draft = NewChangeSet::draft(ownership.flow_id, ownership.project_id, created_by);
    let draft = ChangeSetRepository::create_change_set(conn, new_draft).await?;

    let outcome = clone_graph(
        conn,
        ownership.flow_id,
        GraphScope::Published,
        draft.scope(),
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET_DRAFT,
        flow_id = %ownership.flow_id,
        change_set_id = %draft.id,
        nodes_copied = outcome.nodes_copied,
        edges_copied = outcome.edges_copied,
        "Draft created from published graph"
    );

    Ok(draft)
}

/// Returns the newest active draft for the flow, creating one if none exists.
///
/// Resolution is idempotent: when an active draft already exists it is
/// returned unchanged, with no re-clone and no metadata updates.
pub(crate) async fn resolve_or_create(
    conn: &mut AsyncPgConnection,
    ownership: FlowOwnership,
    created_by: Option<Uuid>,
) -> Result<(ChangeSet, bool)> {
    if let Some(draft) = ChangeSetRepository::find_active_draft(conn, ownership.flow_id).await? {
        tracing::debug!(
            target: TRACING_TARGET_DRAFT,
            flow_id = %ownership.flow_id,
            change_set_id = %draft.id,
            "Reusing existing active draft"
        );
        return Ok((draft, false));
    }

    let draft = create(conn, ownership, created_by).await?;
    Ok((draft, true))
}
