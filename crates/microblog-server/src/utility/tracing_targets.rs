//! Centralized tracing target constants for structured logging.
//!
//! Every target used by the crate is defined here so log output can be
//! filtered per area through `RUST_LOG`.

/// Registration, login, token validation and current-user resolution.
pub const TRACING_TARGET_AUTHENTICATION: &str = "microblog_server::authentication";

/// Post, like and reply operations enforced by the content service.
pub const TRACING_TARGET_CONTENT: &str = "microblog_server::content";

/// Error recovery including middleware errors and request timeouts.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "microblog_server::recovery::error";

/// Panic recovery for handlers.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "microblog_server::recovery::panic";

/// Password hashing and verification operations.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "microblog_server::password_hasher";

/// Session key loading and token signing.
pub const TRACING_TARGET_SESSION_KEYS: &str = "microblog_server::session_keys";
