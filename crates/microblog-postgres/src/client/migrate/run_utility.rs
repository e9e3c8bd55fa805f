use diesel::QueryableByName;
use diesel::migration::{Migration, MigrationSource};
use diesel::pg::Pg;
use diesel::sql_types::{Bool, Text};
use diesel_async::RunQueryDsl;

use super::MigrationStatus;
use crate::{MIGRATIONS, PgConnection, PgError, PgResult, TRACING_TARGET_MIGRATION};

#[derive(QueryableByName)]
struct TableExists {
    #[diesel(sql_type = Bool)]
    exists: bool,
}

#[derive(QueryableByName)]
struct MigrationVersion {
    #[diesel(sql_type = Text)]
    version: String,
}

/// Compares the embedded migrations against the versions recorded in the database.
///
/// A database that was never migrated reports every embedded migration as pending.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_migration_status(conn: &mut PgConnection) -> PgResult<MigrationStatus> {
    let applied_versions = get_applied_migrations(conn).await?;

    let mut embedded_versions: Vec<String> = MigrationSource::<Pg>::migrations(&MIGRATIONS)
        .map_err(PgError::Migration)?
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();
    embedded_versions.sort();

    let pending_versions: Vec<String> = embedded_versions
        .into_iter()
        .filter(|version| !applied_versions.contains(version))
        .collect();

    let status = MigrationStatus::new(applied_versions, pending_versions);

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_migrations(),
        pending = status.pending_migrations(),
        "migration status retrieved"
    );

    Ok(status)
}

/// Returns applied migration versions in ascending order.
async fn get_applied_migrations(conn: &mut PgConnection) -> PgResult<Vec<String>> {
    let table = diesel::sql_query(
        "SELECT to_regclass('__diesel_schema_migrations') IS NOT NULL AS exists",
    )
    .get_result::<TableExists>(conn)
    .await?;

    if !table.exists {
        tracing::debug!(
            target: TRACING_TARGET_MIGRATION,
            "migration table does not exist yet"
        );
        return Ok(Vec::new());
    }

    let versions = diesel::sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<MigrationVersion>(conn)
        .await?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}
