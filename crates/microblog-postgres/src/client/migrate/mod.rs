//! Embedded schema migrations.
//!
//! Migrations are compiled into the binary from `./migrations` and applied on
//! startup by the CLI through [`PgClientMigrationExt`].

mod migrate_result;
mod run_migration;
mod run_utility;

pub use migrate_result::{MigrationResult, MigrationStatus};
pub use run_migration::run_pending_migrations;
pub use run_utility::get_migration_status;

use crate::{PgClient, PgResult};

/// Migration operations available on a [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every embedded migration that has not been applied yet.
    ///
    /// Calling this on an up-to-date database is a no-op.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Compares the embedded migrations with the ones recorded in the database.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_pooled_connection().await?;
        get_migration_status(&mut conn).await
    }
}
