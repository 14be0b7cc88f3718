//! Database migration management.
//!
//! This module applies the embedded migrations and exposes status inspection
//! helpers. All migration work runs through [`run_pending_migrations`], which
//! moves the pooled async connection onto a blocking task because the diesel
//! migration harness is synchronous.

use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Total duration of the migration operation
    pub duration: Duration,
    /// Migration versions applied by this run, in order
    pub applied_versions: Vec<String>,
}

impl MigrationReport {
    /// Creates a new report for a completed migration run.
    pub fn new(duration: Duration, applied_versions: Vec<String>) -> Self {
        Self {
            duration,
            applied_versions,
        }
    }

    /// Returns whether this run applied no migrations.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.applied_versions.is_empty()
    }

    /// Returns the last applied migration version, if any.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(|s| s.as_str())
    }
}

/// Runs all pending migrations on the database.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationReport> {
    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        "Starting database migration process",
    );

    let start_time = Instant::now();
    let conn = pg.get_pooled_connection().await?;

    let mut conn: AsyncConnectionWrapper<_> = conn.into();
    let results = spawn_blocking(move || match conn.run_pending_migrations(MIGRATIONS) {
        Ok(versions) => Ok(versions
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()),
        Err(x) => Err(x),
    })
    .await;

    let duration = start_time.elapsed();
    let results = results.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Migration task panicked, join error occurred"
        );

        PgError::Migration(err.into())
    })?;

    let versions = results.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = &err,
            "Database migration process failed"
        );

        PgError::Migration(err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        migrations_count = versions.len(),
        "Database migration process completed successfully"
    );

    Ok(MigrationReport::new(duration, versions))
}

/// Gets the list of applied migration versions from the database.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    use diesel::sql_query;

    #[derive(diesel::QueryableByName)]
    struct MigrationVersion {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let versions = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<MigrationVersion>(conn)
        .await
        .map_err(|e| PgError::Migration(format!("Failed to get applied migrations: {}", e).into()))?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

/// Verifies that the migration bookkeeping table exists.
///
/// A missing table means the database has never been migrated and every
/// repository call would fail with a relation error.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn verify_migrations_table(conn: &mut AsyncPgConnection) -> PgResult<()> {
    use diesel::sql_query;

    #[derive(diesel::QueryableByName)]
    struct ExistsResult {
        #[diesel(sql_type = diesel::sql_types::Bool)]
        exists: bool,
    }

    let migration_table_exists: bool = sql_query(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_name = '__diesel_schema_migrations'
         ) as exists",
    )
    .get_result::<ExistsResult>(conn)
    .await
    .map_err(|e| PgError::Migration(format!("Failed to check migration table: {}", e).into()))?
    .exists;

    if !migration_table_exists {
        tracing::warn!(
            target: TRACING_TARGET_MIGRATION,
            "Migration table does not exist, database may not be initialized"
        );
        return Err(PgError::Migration(
            "Migration table __diesel_schema_migrations does not exist".into(),
        ));
    }

    Ok(())
}

/// Extension trait providing migration functionality for [`PgClient`].
pub trait PgClientExt {
    /// Runs all pending database migrations.
    ///
    /// This method will apply any unapplied migrations to bring the database schema
    /// up to date. It's safe to call this method multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if any migration fails to apply or if there are
    /// connectivity issues with the database.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationReport>>;

    /// Gets the list of applied migration versions.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration table cannot be accessed.
    fn applied_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>>;

    /// Verifies that the migration bookkeeping table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if verification cannot be completed or the table
    /// is missing.
    fn verify_migrations_table(&self) -> impl Future<Output = PgResult<()>>;
}

impl PgClientExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationReport> {
        run_pending_migrations(self).await
    }

    async fn applied_migrations(&self) -> PgResult<Vec<String>> {
        let mut conn = self.get_connection().await?;
        applied_migrations(&mut conn).await
    }

    async fn verify_migrations_table(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;
        verify_migrations_table(&mut conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_no_op() {
        let report = MigrationReport::new(Duration::from_millis(12), vec![]);
        assert!(report.is_no_op());
        assert_eq!(report.last_applied_version(), None);
    }

    #[test]
    fn report_applied() {
        let report = MigrationReport::new(
            Duration::from_millis(120),
            vec!["00000000000000".into(), "2025-06-02-101500".into()],
        );
        assert!(!report.is_no_op());
        assert_eq!(report.last_applied_version(), Some("2025-06-02-101500"));
    }
}
