//! Constraint violations shaped like the ones PostgreSQL reports.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error};
use microblog_postgres::PgError;

struct Violation {
    constraint: &'static str,
    message: String,
}

impl DatabaseErrorInformation for Violation {
    fn message(&self) -> &str {
        &self.message
    }

    fn details(&self) -> Option<&str> {
        None
    }

    fn hint(&self) -> Option<&str> {
        None
    }

    fn table_name(&self) -> Option<&str> {
        self.constraint.split('_').next()
    }

    fn column_name(&self) -> Option<&str> {
        None
    }

    fn constraint_name(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn statement_position(&self) -> Option<i32> {
        None
    }
}

fn violation(kind: DatabaseErrorKind, constraint: &'static str, message: String) -> PgError {
    PgError::Query(Error::DatabaseError(
        kind,
        Box::new(Violation {
            constraint,
            message,
        }),
    ))
}

pub(crate) fn unique(constraint: &'static str) -> PgError {
    violation(
        DatabaseErrorKind::UniqueViolation,
        constraint,
        format!("duplicate key value violates unique constraint \"{constraint}\""),
    )
}

pub(crate) fn foreign_key(constraint: &'static str) -> PgError {
    violation(
        DatabaseErrorKind::ForeignKeyViolation,
        constraint,
        format!("insert violates foreign key constraint \"{constraint}\""),
    )
}

pub(crate) fn check(constraint: &'static str) -> PgError {
    violation(
        DatabaseErrorKind::CheckViolation,
        constraint,
        format!("new row violates check constraint \"{constraint}\""),
    )
}
