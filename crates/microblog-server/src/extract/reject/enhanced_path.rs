use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::enhanced_json::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// Path parameter extractor with `400 bad_request` rejections.
///
/// [`Path`]: AxumPath
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Creates a new instance of [`Path`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner path parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor =
            <AxumPath<T> as FromRequestParts<S>>::from_request_parts(parts, state).await;
        extractor.map(|x| Self(x.0)).map_err(Into::into)
    }
}

impl From<PathRejection> for Error<'static> {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                let error_message = err.to_string();
                ErrorKind::BadRequest
                    .with_message("Invalid path parameter format")
                    .with_context(format!(
                        "{}. {}",
                        sanitize_error_message(&error_message),
                        enhance_deserialization_error(&error_message)
                    ))
            }
            PathRejection::MissingPathParams(err) => ErrorKind::BadRequest
                .with_message("Required path parameter missing")
                .with_context(sanitize_error_message(&err.to_string())),
            _ => ErrorKind::InternalServerError
                .with_message("Path processing failed")
                .with_context("Unexpected error during path parameter processing"),
        }
    }
}

/// Adds type-specific guidance to a deserialization failure.
fn enhance_deserialization_error(error_message: &str) -> &'static str {
    let error_lower = error_message.to_lowercase();

    if error_lower.contains("invalid digit") || error_lower.contains("cannot parse") {
        "Identifiers must be whole numbers"
    } else {
        "Check that the parameter format matches the expected type"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_hint_for_digit_errors() {
        assert_eq!(
            enhance_deserialization_error("Cannot parse `abc` to a `i64`"),
            "Identifiers must be whole numbers"
        );
        assert_eq!(
            enhance_deserialization_error("something else"),
            "Check that the parameter format matches the expected type"
        );
    }
}
