//! HTTP middleware and extractors for admin.
//!
//! Sentry and request tracing layers are applied in `main.rs`; this module
//! holds the per-route authentication extractors.

pub mod auth;

pub use auth::{AuthRejection, OptionalIdentity, RequireAdmin, RequireIdentity};
