//! HTTP server startup and graceful shutdown.

mod error;
mod http_server;
mod shutdown;

use axum::Router;

pub use self::error::{Result, ServerError};
use self::http_server::serve_http;
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;

/// Binds the configured address and serves `app` until a shutdown signal.
pub async fn serve(app: Router, config: ServerConfig) -> Result<()> {
    serve_http(app, config).await
}
