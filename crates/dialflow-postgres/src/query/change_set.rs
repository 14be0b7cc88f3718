//! Change set repository for managing change set table operations.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::Pagination;
use crate::model::{ChangeSet, NewChangeSet, UpdateChangeSet};
use crate::types::ChangeSetStatus;
use crate::{PgError, PgResult, schema};

/// Repository for change set table operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeSetRepository;

impl ChangeSetRepository {
    /// Creates a new change set repository instance.
    pub fn new() -> Self {
        Self
    }

    /// Creates a new change set.
    pub async fn create_change_set(
        conn: &mut AsyncPgConnection,
        new_change_set: NewChangeSet,
    ) -> PgResult<ChangeSet> {
        use schema::change_sets;

        diesel::insert_into(change_sets::table)
            .values(&new_change_set)
            .returning(ChangeSet::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Finds a change set by its ID.
    pub async fn find_change_set_by_id(
        conn: &mut AsyncPgConnection,
        change_set_id: Uuid,
    ) -> PgResult<Option<ChangeSet>> {
        use schema::change_sets::{self, dsl};

        change_sets::table
            .filter(dsl::id.eq(change_set_id))
            .select(ChangeSet::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    /// Finds the newest active draft for a flow.
    ///
    /// Multiple concurrent drafts are permitted, so callers that resolve
    /// "the" draft get the most recently created one.
    pub async fn find_active_draft(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
    ) -> PgResult<Option<ChangeSet>> {
        use schema::change_sets::{self, dsl};

        change_sets::table
            .filter(dsl::flow_id.eq(flow_id))
            .filter(dsl::status.eq(ChangeSetStatus::Draft))
            .filter(dsl::is_active.eq(true))
            .order(dsl::created_at.desc())
            .select(ChangeSet::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    /// Lists change sets for a flow, newest first.
    ///
    /// Archived snapshots accumulate forever, so they are excluded unless
    /// explicitly requested.
    pub async fn list_flow_change_sets(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        include_archived: bool,
        pagination: Pagination,
    ) -> PgResult<Vec<ChangeSet>> {
        use schema::change_sets::{self, dsl};

        let mut query = change_sets::table
            .filter(dsl::flow_id.eq(flow_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(ChangeSet::as_select())
            .into_boxed();

        if !include_archived {
            query = query.filter(dsl::status.ne(ChangeSetStatus::Archived));
        }

        query.load(conn).await.map_err(PgError::from)
    }

    /// Updates a change set.
    pub async fn update_change_set(
        conn: &mut AsyncPgConnection,
        change_set_id: Uuid,
        updates: UpdateChangeSet,
    ) -> PgResult<ChangeSet> {
        use schema::change_sets::{self, dsl};

        diesel::update(change_sets::table.filter(dsl::id.eq(change_set_id)))
            .set(&updates)
            .returning(ChangeSet::as_returning())
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }

    /// Counts change sets for a flow.
    pub async fn count_flow_change_sets(
        conn: &mut AsyncPgConnection,
        flow_id: Uuid,
        include_archived: bool,
    ) -> PgResult<i64> {
        use schema::change_sets::{self, dsl};

        let mut query = change_sets::table
            .filter(dsl::flow_id.eq(flow_id))
            .count()
            .into_boxed();

        if !include_archived {
            query = query.filter(dsl::status.ne(ChangeSetStatus::Archived));
        }

        query.get_result(conn).await.map_err(PgError::from)
    }
}
