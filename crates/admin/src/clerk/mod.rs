//! Clerk identity provider integration.
//!
//! # Features
//!
//! - Session token verification (RS256, PEM public key) without network I/O
//! - Backend API user lookup for the authoritative `private_metadata.role`
//!
//! Session tokens arrive either as `Authorization: Bearer <jwt>` (API
//! clients) or in the `__session` cookie (browser).

mod client;
mod error;
mod session;
mod types;

pub use client::ClerkClient;
pub use error::ClerkError;
pub use session::{SESSION_COOKIE_NAME, SessionVerifier, session_token};
pub use types::{ClerkApiErrorResponse, ClerkUser};
