//! Integration tests for Clerk Admin.
//!
//! Every test is `#[ignore]`d because it needs external services.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests (ADMIN_DATABASE_URL must point at a disposable database)
//! cargo test -p clerk-admin-integration-tests --test chat_permissions_db -- --ignored
//!
//! # Server tests (the admin server must be running)
//! cargo run -p clerk-admin &
//! cargo test -p clerk-admin-integration-tests --test admin_server -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - database for repository tests
//! - `ADMIN_BASE_URL` - running server (default `http://localhost:3001`)
//! - `CLERK_TEST_ADMIN_TOKEN` - session token of an admin user
//! - `CLERK_TEST_USER_TOKEN` - session token of a non-admin user

use std::time::{SystemTime, UNIX_EPOCH};

/// Base URL of the running admin server.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client that does not follow redirects, so tests can assert on them.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A user ID no other test run will use.
#[must_use]
pub fn unique_user_id(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("user_it_{prefix}_{nanos}")
}
