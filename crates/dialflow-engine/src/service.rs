//! The engine facade exposed to embedding applications.

use std::fmt;
use std::sync::Arc;

use diesel_async::scoped_futures::ScopedFutureExt;
use dialflow_postgres::PgClient;
use dialflow_postgres::model::{ChangeSet, UpdateChangeSet};
use dialflow_postgres::query::{ChangeSetRepository, Pagination};
use dialflow_postgres::types::ChangeSetStatus;
use uuid::Uuid;

use crate::collab::{FlowOwnership, FlowValidator, ProjectDirectory, has_errors};
use crate::{
    Error, Result, TRACING_TARGET_DISCARD, TRACING_TARGET_DRAFT, TRACING_TARGET_PUBLISH,
    TRACING_TARGET_VALIDATE, discard, draft, publish,
};

/// Versioning engine for call-routing flow graphs.
///
/// Callers are assumed to be pre-authorized; authorization checks belong to
/// the embedding application. All mutating operations run as one database
/// transaction and either fully succeed or leave no trace.
///
/// # Example
///
/// ```ignore
/// let service = FlowVersionService::new(postgres, directory, validator);
///
/// let draft = service.get_or_create_draft(flow_id, Some(editor_id)).await?;
/// // ... editor mutates the draft scope through the graph repositories ...
/// service.publish(draft.id, editor_id).await?;
/// ```
#[derive(Clone)]
pub struct FlowVersionService {
    postgres: PgClient,
    directory: Arc<dyn ProjectDirectory>,
    validator: Arc<dyn FlowValidator>,
}

impl FlowVersionService {
    /// Creates a new versioning engine over the given database client and
    /// collaborators.
    pub fn new(
        postgres: PgClient,
        directory: Arc<dyn ProjectDirectory>,
        validator: Arc<dyn FlowValidator>,
    ) -> Self {
        Self {
            postgres,
            directory,
            validator,
        }
    }

    /// Creates a new draft for the flow.
    ///
    /// The entire published graph is cloned into the draft's scope, giving
    /// the editor a full, independent working copy. Concurrent drafts for
    /// one flow are permitted.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_DRAFT)]
    pub async fn create_draft(
        &self,
        flow_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<ChangeSet> {
        let ownership = self.resolve_ownership(flow_id).await?;

        let mut conn = self.postgres.get_connection().await?;
        conn.build_transaction()
            .run(|conn| draft::create(conn, ownership, created_by).scope_boxed())
            .await
    }

    /// Returns the newest active draft for the flow, creating one if none
    /// exists.
    ///
    /// Idempotent: a second call without intervening publish or discard
    /// returns the same change set and performs no clone.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_DRAFT)]
    pub async fn get_or_create_draft(
        &self,
        flow_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<ChangeSet> {
        let ownership = self.resolve_ownership(flow_id).await?;

        let mut conn = self.postgres.get_connection().await?;
        let (change_set, _created) = conn
            .build_transaction()
            .run(|conn| draft::resolve_or_create(conn, ownership, created_by).scope_boxed())
            .await?;

        Ok(change_set)
    }

    /// Runs structural validation over the draft's scope and, on success,
    /// moves the change set from draft to validated.
    ///
    /// Error-severity diagnostics fail the call with [`Error::InvalidFlow`];
    /// warnings are logged and do not block.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_VALIDATE)]
    pub async fn validate(&self, change_set_id: Uuid) -> Result<ChangeSet> {
        let mut conn = self.postgres.get_connection().await?;

        let change_set = ChangeSetRepository::find_change_set_by_id(&mut conn, change_set_id)
            .await?
            .ok_or(Error::ChangeSetNotFound { change_set_id })?;

        if !change_set.can_transition_to(ChangeSetStatus::Validated) {
            return Err(Error::InvalidStateTransition {
                from: change_set.status,
                to: ChangeSetStatus::Validated,
            });
        }

        let diagnostics = self
            .validator
            .check_scope(change_set.flow_id, change_set.scope())
            .await
            .map_err(|source| Error::collaborator("structural-validator", source))?;

        if has_errors(&diagnostics) {
            return Err(Error::InvalidFlow { diagnostics });
        }

        if !diagnostics.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET_VALIDATE,
                change_set_id = %change_set.id,
                warnings = diagnostics.len(),
                "Draft validated with warnings"
            );
        }

        let validated = ChangeSetRepository::update_change_set(
            &mut conn,
            change_set.id,
            UpdateChangeSet {
                status: Some(ChangeSetStatus::Validated),
                ..Default::default()
            },
        )
        .await?;

        Ok(validated)
    }

    /// Atomically publishes the change set's draft scope as the live graph.
    ///
    /// The previous published graph is preserved under a freshly created
    /// archived change set; the draft's own scope stays untouched as the
    /// record of what was published. Any step failing rolls back all steps.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_PUBLISH)]
    pub async fn publish(&self, change_set_id: Uuid, published_by: Uuid) -> Result<ChangeSet> {
        let mut conn = self.postgres.get_connection().await?;
        conn.build_transaction()
            .run(|conn| publish::execute(conn, change_set_id, published_by).scope_boxed())
            .await
    }

    /// Permanently deletes the draft's graph scope and marks the change set
    /// discarded. Irreversible.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_DISCARD)]
    pub async fn discard(&self, change_set_id: Uuid) -> Result<ChangeSet> {
        let mut conn = self.postgres.get_connection().await?;
        conn.build_transaction()
            .run(|conn| discard::execute(conn, change_set_id).scope_boxed())
            .await
    }

    /// Lists the flow's change sets, newest first.
    ///
    /// Archived snapshots accumulate forever and are excluded unless
    /// requested.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_DRAFT)]
    pub async fn list_by_flow(
        &self,
        flow_id: Uuid,
        include_archived: bool,
        pagination: Pagination,
    ) -> Result<Vec<ChangeSet>> {
        let mut conn = self.postgres.get_connection().await?;
        let change_sets = ChangeSetRepository::list_flow_change_sets(
            &mut conn,
            flow_id,
            include_archived,
            pagination,
        )
        .await?;

        Ok(change_sets)
    }

    /// Updates the editor-facing metadata of a still-editable change set.
    #[tracing::instrument(skip(self, version_name, description), target = TRACING_TARGET_DRAFT)]
    pub async fn update_metadata(
        &self,
        change_set_id: Uuid,
        version_name: Option<String>,
        description: Option<String>,
    ) -> Result<ChangeSet> {
        let mut conn = self.postgres.get_connection().await?;

        let change_set = ChangeSetRepository::find_change_set_by_id(&mut conn, change_set_id)
            .await?
            .ok_or(Error::ChangeSetNotFound { change_set_id })?;

        if !change_set.is_editable() {
            return Err(Error::InvalidStateTransition {
                from: change_set.status,
                to: change_set.status,
            });
        }

        let updated = ChangeSetRepository::update_change_set(
            &mut conn,
            change_set.id,
            UpdateChangeSet {
                version_name: Some(version_name),
                description: Some(description),
                ..Default::default()
            },
        )
        .await?;

        Ok(updated)
    }

    /// Resolves and checks the ownership record for a flow.
    async fn resolve_ownership(&self, flow_id: Uuid) -> Result<FlowOwnership> {
        let ownership = self
            .directory
            .resolve_flow(flow_id)
            .await
            .map_err(|source| Error::collaborator("project-directory", source))?
            .ok_or(Error::FlowNotFound { flow_id })?;

        if !ownership.is_owned() {
            return Err(Error::MissingOwnership { flow_id });
        }

        Ok(ownership)
    }
}

impl fmt::Debug for FlowVersionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowVersionService")
            .field("postgres", &self.postgres)
            .finish_non_exhaustive()
    }
}
