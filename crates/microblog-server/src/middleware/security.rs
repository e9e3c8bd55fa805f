//! CORS, request body limits and baseline security headers.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// Largest accepted request body. Every payload is a small JSON document.
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers CORS, the body size limit and baseline security headers.
    fn with_security(self, cors: &CorsConfig) -> Self;

    /// Layers security middlewares with the default (any origin) CORS policy.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig) -> Self {
        self.layer(DefaultBodyLimit::max(DEFAULT_MAX_BODY_SIZE))
            .layer(cors.to_layer())
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&CorsConfig::default())
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, any origin is allowed, as in development.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-allowed-origins", env = "CORS_ALLOWED_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-max-age", env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    ///
    /// Only honoured together with an explicit origin list.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-allow-credentials", env = "CORS_ALLOW_CREDENTIALS", default_value = "false")
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to header values, skipping unparsable ones.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect()
    }

    /// Rejects origins that are not valid header values.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(origin) = self
            .allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(crate::Error::config(format!(
                "invalid CORS origin: {origin}"
            )));
        }

        Ok(())
    }

    /// Builds the CORS layer.
    pub fn to_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .max_age(self.max_age());

        if self.allowed_origins.is_empty() {
            return layer.allow_origin(AllowOrigin::any());
        }

        layer
            .allow_origin(self.to_header_values())
            .allow_credentials(self.allow_credentials)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    fn server(cors: &CorsConfig) -> anyhow::Result<TestServer> {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_security(cors);
        Ok(TestServer::new(router)?)
    }

    #[tokio::test]
    async fn empty_origin_list_allows_any_origin() -> anyhow::Result<()> {
        let server = server(&CorsConfig::default())?;

        let response = server
            .get("/")
            .add_header(ORIGIN, "https://anywhere.example")
            .await;
        assert_eq!(response.header(ACCESS_CONTROL_ALLOW_ORIGIN), "*");
        assert_eq!(response.header(header::X_CONTENT_TYPE_OPTIONS), "nosniff");
        Ok(())
    }

    #[tokio::test]
    async fn explicit_origins_are_echoed() -> anyhow::Result<()> {
        let cors = CorsConfig {
            allowed_origins: vec!["https://app.example".into()],
            allow_credentials: true,
            ..CorsConfig::default()
        };
        let server = server(&cors)?;

        let response = server
            .get("/")
            .add_header(ORIGIN, "https://app.example")
            .await;
        assert_eq!(
            response.header(ACCESS_CONTROL_ALLOW_ORIGIN),
            "https://app.example"
        );

        let response = server
            .get("/")
            .add_header(ORIGIN, "https://evil.example")
            .await;
        assert!(response.maybe_header(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        Ok(())
    }

    #[test]
    fn invalid_origin_fails_validation() {
        let cors = CorsConfig {
            allowed_origins: vec!["bad\norigin".into()],
            ..CorsConfig::default()
        };
        assert!(cors.validate().is_err());
        assert!(CorsConfig::default().validate().is_ok());
    }
}
