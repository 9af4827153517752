//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Redirect to dashboard
//! GET  /dashboard                       - Profile, role and quick links
//!
//! # Tasks (signed-in users)
//! GET  /tasks                           - Task list
//! POST /tasks                           - Add a task
//!
//! # Chat (signed-in users with chat permission)
//! GET  /chat                            - Chat page
//! POST /api/chat/messages               - Send a message (JSON)
//!
//! # Admin (admin role only)
//! GET  /admin                           - Admin landing
//! GET  /admin/chat-permissions          - Permission table
//! POST /admin/chat-permissions/grant    - Grant chat access
//! POST /admin/chat-permissions/revoke   - Revoke chat access
//! GET  /api/test-gemini                 - Generation connectivity test
//! POST /api/test-gemini                 - Generation test with a custom prompt
//! ```
//!
//! `/health` and `/health/ready` are mounted in `main.rs`.

pub mod admin;
pub mod api;
pub mod chat;
pub mod dashboard;
pub mod tasks;

use askama::Template;
use axum::{Router, response::Html, response::Redirect, routing::get};
use serde::Deserialize;

use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .merge(dashboard::router())
        .merge(tasks::router())
        .merge(chat::router())
        .merge(admin::router())
        .merge(api::router())
}

/// One-shot status messages carried in the query string after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    /// Redirect to `path` with a success message.
    #[must_use]
    pub fn success(path: &str, message: &str) -> Redirect {
        Self::redirect(path, "success", message)
    }

    /// Redirect to `path` with an error message.
    #[must_use]
    pub fn error(path: &str, message: &str) -> Redirect {
        Self::redirect(path, "error", message)
    }

    fn redirect(path: &str, key: &str, message: &str) -> Redirect {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(key, message)
            .finish();
        Redirect::to(&format!("{path}?{query}"))
    }
}

/// Render a template, logging failures instead of propagating them.
fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to render template");
        "Internal Server Error".to_string()
    }))
}
