//! Application state and dependency injection.

mod auth_service;
mod config;
mod content_service;
mod security;

use microblog_postgres::{PgClient, Store};

pub use crate::service::auth_service::{AuthService, IssuedSession, LoginPath, Profile};
pub use crate::service::config::ServiceConfig;
pub use crate::service::content_service::{
    ContentKind, ContentService, PostDetail, validate_content,
};
pub use crate::service::security::{
    MIN_SECRET_LENGTH, PasswordHasher, SessionClaims, SessionKeys, SessionKeysConfig,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). Generic over the
/// [`Store`] so handlers run unchanged against PostgreSQL and the in-memory
/// store used in tests.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState<S = PgClient> {
    // External services:
    pub store: S,

    // Internal services:
    pub password_hasher: PasswordHasher,
    pub session_keys: SessionKeys,
    pub auth: AuthService<S>,
    pub content: ContentService<S>,
}

impl ServiceState<PgClient> {
    /// Initializes application state from configuration.
    ///
    /// Loads the signing secret, connects to Postgres (waiting for it to
    /// become ready) and applies pending migrations.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        service_config.validate()?;
        let session_keys = service_config.load_session_keys().await?;
        let postgres = service_config.connect_postgres().await?;
        Ok(Self::new(postgres, session_keys))
    }
}

impl<S: Store> ServiceState<S> {
    /// Wires the services around an existing store.
    pub fn new(store: S, session_keys: SessionKeys) -> Self {
        let password_hasher = PasswordHasher::new();
        Self {
            auth: AuthService::new(store.clone(), password_hasher.clone(), session_keys.clone()),
            content: ContentService::new(store.clone()),
            store,
            password_hasher,
            session_keys,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl<S: Store> axum::extract::FromRef<ServiceState<S>> for $t {
            fn from_ref(state: &ServiceState<S>) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// Internal services:
impl_di!(password_hasher: PasswordHasher);
impl_di!(session_keys: SessionKeys);
impl_di!(auth: AuthService<S>);
impl_di!(content: ContentService<S>);
