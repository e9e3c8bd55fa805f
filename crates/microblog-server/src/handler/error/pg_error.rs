//! Database error to HTTP error conversion.
//!
//! Named constraint violations become domain errors first (duplicate
//! credentials, like conflicts, missing parents), then take the service error
//! path. Everything else is logged here and answered with a generic 500.

use microblog_postgres::PgError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "microblog_server::handler::postgres";

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if error.constraint_violation().is_some() {
            return crate::Error::from(error).into();
        }

        match error {
            PgError::Config(ref config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
            }
            PgError::Connection(ref connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
            }
            PgError::Migration(ref migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
            }
            PgError::Query(ref query_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "database query error"
                );
            }
            PgError::Unexpected(ref message) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %message,
                    "unexpected database error"
                );
            }
        }

        ErrorKind::InternalServerError.into_error()
    }
}

#[cfg(test)]
mod tests {
    use microblog_postgres::error::TimeoutType;

    use super::*;

    #[test]
    fn infrastructure_errors_are_internal() {
        let error = Error::from(PgError::Timeout(TimeoutType::Wait));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);

        let error = Error::from(PgError::Unexpected("boom".into()));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
    }
}
