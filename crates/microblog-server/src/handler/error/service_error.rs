//! Service error to HTTP error conversion.
//!
//! Domain errors keep their client message; storage, configuration and
//! internal errors are logged with their source and answered with a generic
//! 500 body.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::{Error as ServiceError, ErrorKind as ServiceErrorKind};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "microblog_server::handler::service";

impl From<ServiceError> for HttpError<'static> {
    fn from(error: ServiceError) -> Self {
        let message = error.message().to_owned();

        match error.kind() {
            ServiceErrorKind::DuplicateCredential(field) => ErrorKind::BadRequest
                .with_message(message)
                .with_resource(field.as_str()),

            ServiceErrorKind::InvalidCredentials | ServiceErrorKind::Unauthenticated => {
                ErrorKind::Unauthorized.with_message(message)
            }

            ServiceErrorKind::NotFound(resource) => ErrorKind::NotFound
                .with_message(message)
                .with_resource(resource.as_str()),

            ServiceErrorKind::Validation(_) => ErrorKind::BadRequest
                .with_message(message)
                .with_context("content"),

            ServiceErrorKind::Conflict => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "write lost a uniqueness race"
                );
                ErrorKind::BadRequest.with_message(message)
            }

            ServiceErrorKind::Forbidden => ErrorKind::Forbidden.with_message(message),

            ServiceErrorKind::Storage => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    source = ?error.source_ref(),
                    "storage operation failed"
                );
                ErrorKind::InternalServerError.into_error()
            }

            ServiceErrorKind::Config | ServiceErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    source = ?error.source_ref(),
                    error_kind = %error.kind(),
                    "service operation failed"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use microblog_postgres::PgError;

    use super::*;
    use crate::{ContentViolation, CredentialField, Resource};

    #[test]
    fn domain_errors_keep_their_message() {
        let error = HttpError::from(ServiceError::duplicate(CredentialField::Username));
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Username already registered"));

        let error = HttpError::from(ServiceError::invalid_credentials());
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(error.message(), Some("Incorrect email or password"));

        let error = HttpError::from(ServiceError::not_found(Resource::Post));
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.resource(), Some("post"));

        let error = HttpError::from(ServiceError::validation(
            ContentViolation::TooLong,
            "Content exceeds 280 characters",
        ));
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let error = HttpError::from(ServiceError::conflict("Could not like post"));
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Could not like post"));

        let error = HttpError::from(ServiceError::forbidden("nope"));
        assert_eq!(error.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn storage_errors_hide_details() {
        let source = PgError::Config("postgres://user:secret@db".into());
        let error = HttpError::from(ServiceError::from(source));

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
        assert!(!error.to_string().contains("secret"));
    }
}
