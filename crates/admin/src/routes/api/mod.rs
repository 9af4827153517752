//! API route handlers for admin.
//!
//! JSON API endpoints for admin-only operations.

pub mod test_gemini;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new().merge(test_gemini::router())
}
