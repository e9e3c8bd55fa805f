//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, request timeout
//! └── service: ServiceConfig        # Postgres pool, session keys
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! ```bash
//! microblog --postgres-url "postgresql://..." --port 8000
//!
//! POSTGRES_URL="postgresql://..." PORT=8000 microblog
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use microblog_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "microblog")]
#[command(about = "Micro-blogging API server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Database and session key configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so clap's `env` fallbacks see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, `info` by default.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates every configuration group before anything connects.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        self.server.log();
        self.middleware.log();

        let postgres = &self.service.postgres;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_max_connections = postgres.postgres_max_connections,
            postgres_connection_timeout_secs = ?postgres.postgres_connection_timeout_secs,
            postgres_idle_timeout_secs = ?postgres.postgres_idle_timeout_secs,
            postgres_connect_attempts = postgres.postgres_connect_attempts,
            postgres_connect_delay_secs = postgres.postgres_connect_delay_secs,
            "database configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            token_ttl_secs = self.service.session_keys.auth_token_ttl_secs,
            secret_from_file = self.service.session_keys.auth_secret_file.is_some(),
            "session key configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_into_groups() {
        let cli = Cli::try_parse_from([
            "microblog",
            "--port",
            "9000",
            "--postgres-url",
            "postgresql://localhost/microblog",
            "--auth-secret",
            "an-example-secret-that-is-long-enough",
            "--cors-allowed-origins",
            "https://a.example,https://b.example",
        ])
        .unwrap();

        assert_eq!(cli.server.port, 9000);
        assert_eq!(cli.middleware.cors.allowed_origins.len(), 2);
        assert!(cli.validate().is_ok());
    }
}
