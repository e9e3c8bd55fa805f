//! Service layer configuration.

#[cfg(feature = "config")]
use clap::Args;
use microblog_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use serde::{Deserialize, Serialize};

use crate::service::{SessionKeys, SessionKeysConfig};
use crate::{Error, Result};

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// PostgreSQL connection pool settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// Session token signing settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub session_keys: SessionKeysConfig,
}

impl ServiceConfig {
    /// Creates a new configuration from its parts.
    pub fn new(postgres: PgConfig, session_keys: SessionKeysConfig) -> Self {
        Self {
            postgres,
            session_keys,
        }
    }

    /// Validates every configuration group.
    pub fn validate(&self) -> Result<()> {
        self.postgres
            .validate()
            .map_err(|e| Error::config("Invalid database configuration").with_source(e))?;
        self.session_keys.validate()
    }

    /// Connects to Postgres, waiting for it to become ready, and runs migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new_with_test(self.postgres.clone())
            .await
            .map_err(|e| Error::storage("Failed to connect to the database").with_source(e))?;

        pg_client
            .run_pending_migrations()
            .await
            .map_err(|e| Error::storage("Failed to apply database migrations").with_source(e))?;

        Ok(pg_client)
    }

    /// Loads session signing keys.
    pub async fn load_session_keys(&self) -> Result<SessionKeys> {
        SessionKeys::from_config(&self.session_keys).await
    }
}
