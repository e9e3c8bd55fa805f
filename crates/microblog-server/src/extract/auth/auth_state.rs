//! Current user resolution for protected routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use derive_more::Deref;
use microblog_postgres::Store;
use microblog_postgres::model::User;

use super::AuthHeader;
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, Result};
use crate::service::ServiceState;

/// The user a verified session token belongs to.
///
/// Extraction verifies the bearer token and loads its subject. Any failure
/// after the header was found (bad signature, expired token, deleted user)
/// rejects with `401 unauthorized`. The resolved user is cached in the
/// request extensions.
#[derive(Debug, Clone, Deref, PartialEq)]
pub struct AuthState(pub User);

impl AuthState {
    /// Returns the authenticated user.
    #[inline]
    pub fn into_user(self) -> User {
        self.0
    }
}

impl<S> FromRequestParts<ServiceState<S>> for AuthState
where
    S: Store,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState<S>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let user = state
            .auth
            .resolve_current_user(auth_header.token())
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = user.id,
            "request authenticated"
        );

        let auth_state = Self(user);
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}
