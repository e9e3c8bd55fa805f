use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Query string extractor with `400 bad_request` rejections that name the
/// offending parameter.
///
/// ```rust,no_run
/// use microblog_server::extract::Query;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct FeedParams {
///     limit: Option<i64>,
///     offset: Option<i64>,
/// }
///
/// // Route: /posts?limit=10&offset=20
/// async fn feed(Query(params): Query<FeedParams>) {
///     let _ = (params.limit, params.offset);
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Creates a new [`Query`] wrapper around the provided query parameters.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes the wrapper and returns the inner query parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(enhance_query_error(rejection)),
        }
    }
}

fn enhance_query_error(rejection: QueryRejection) -> Error<'static> {
    tracing::debug!(
        target: "microblog_server::extract::query",
        error = %rejection,
        "query parameter parsing failed"
    );

    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => {
            let error_message = err.to_string();

            if error_message.contains("missing field") {
                let field_name = extract_field_name_from_error(&error_message);
                ErrorKind::BadRequest
                    .with_message("Missing required query parameter")
                    .with_context(format!(
                        "The query parameter '{}' is required but was not provided",
                        field_name.unwrap_or("unknown")
                    ))
            } else if error_message.contains("invalid")
                || error_message.contains("cannot parse")
                || error_message.contains("invalid digit")
            {
                ErrorKind::BadRequest
                    .with_message("Invalid query parameter type")
                    .with_context(error_message)
            } else {
                ErrorKind::BadRequest
                    .with_message("Invalid query parameters")
                    .with_context(error_message)
            }
        }
        _ => ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context("The query string could not be parsed"),
    }
}

/// Best-effort extraction of the field name from a serde error message.
fn extract_field_name_from_error(error_message: &str) -> Option<&str> {
    if let Some(start) = error_message.find('`')
        && let Some(end) = error_message[start + 1..].find('`')
    {
        return Some(&error_message[start + 1..start + 1 + end]);
    }

    if let Some(start) = error_message.find("field ") {
        let field_part = &error_message[start + 6..];
        if let Some(end) = field_part.find(' ') {
            return Some(&field_part[..end]);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_field_names() {
        assert_eq!(
            extract_field_name_from_error("missing field `post_id`"),
            Some("post_id")
        );
        assert_eq!(
            extract_field_name_from_error("duplicate field limit at line 1"),
            Some("limit")
        );
        assert_eq!(extract_field_name_from_error("some other error"), None);
    }
}
