//! Request extractors with rejections that render as the server's JSON
//! error body.
//!
//! - [`AuthHeader`] and [`AuthState`] for bearer-token authentication.
//! - [`Json`], [`ValidateJson`], [`Path`] and [`Query`] as drop-in
//!   replacements for the axum extractors of the same name.

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AuthHeader, AuthState};
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};
