//! Monitor response types.

use serde::{Deserialize, Serialize};

/// Liveness of the process and its database.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// `ok` or `degraded`.
    pub status: String,
    /// `up` or `down`.
    pub database: String,
}

impl Health {
    /// Builds the report from the result of a database ping.
    pub fn from_database(database_up: bool) -> Self {
        let (status, database) = match database_up {
            true => ("ok", "up"),
            false => ("degraded", "down"),
        };

        Self {
            status: status.to_owned(),
            database: database.to_owned(),
        }
    }

    /// Returns whether every dependency is reachable.
    pub fn is_healthy(&self) -> bool {
        self.database == "up"
    }
}
