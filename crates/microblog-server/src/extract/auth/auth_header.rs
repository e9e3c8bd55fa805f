//! Bearer token extraction from the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind};

/// Raw bearer token taken from the `Authorization` header.
///
/// The token is not verified here; see [`AuthState`] for that. A missing
/// header rejects with `missing_auth_token`, a header that is not a bearer
/// credential with `malformed_auth_token`.
///
/// [`AuthState`]: super::AuthState
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader(String);

impl AuthHeader {
    /// Wraps an already extracted token.
    #[inline]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token.
    #[inline]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthHeader").field(&"[REDACTED]").finish()
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Sync + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => {
                let auth_header = Self::new(bearer.token());
                parts.extensions.insert(auth_header.clone());
                Ok(auth_header)
            }
            Err(rejection) => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    reason = %rejection,
                    "authorization header rejected"
                );

                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken.into_error(),
                    TypedHeaderRejectionReason::Error(_) => {
                        ErrorKind::MalformedAuthToken.into_error()
                    }
                    _ => ErrorKind::InternalServerError
                        .with_message("Authentication processing failed")
                        .with_resource("authentication"),
                };
                Err(error)
            }
        }
    }
}
