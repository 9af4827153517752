//! Chat route handlers.
//!
//! The page is server-rendered; messages go through a small JSON endpoint.

use askama::Template;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ChatPermissionRepository;
use crate::filters;
use crate::middleware::RequireIdentity;
use crate::services::{
    ChatError, ChatService, FallbackClient, MAX_MESSAGE_LENGTH, RoleResolver, SendMessageResult,
};
use crate::state::AppState;

use super::dashboard::UserView;
use super::{Flash, render};

/// Chat page template.
#[derive(Template)]
#[template(path = "chat.html")]
struct ChatPageTemplate {
    user: UserView,
    current_path: String,
    flash: Flash,
    has_permission: bool,
    max_length: usize,
}

/// Request to send a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", get(chat_page))
        .route("/api/chat/messages", post(send_message))
}

/// Render the chat page.
///
/// GET /chat
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn chat_page(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Html<String> {
    let store = ChatPermissionRepository::new(state.pool());
    let resolver = RoleResolver::new(state.clerk(), &store);
    let has_permission = resolver.check_chat_permission(Some(&identity)).await;

    let template = ChatPageTemplate {
        user: UserView::resolve(&state, &identity).await,
        current_path: "/chat".to_string(),
        flash: Flash::default(),
        has_permission,
        max_length: MAX_MESSAGE_LENGTH,
    };

    render(&template)
}

/// Answer a chat message.
///
/// Always responds 200 with `{success, response?, error?}`; errors are
/// masked for display. A body without a string `message` reads as an empty
/// message.
///
/// POST /api/chat/messages
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn send_message(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    request: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Json<SendMessageResult> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::info!(error = %rejection, "Malformed chat message body");
            return Json(SendMessageResult::from(Err::<String, _>(ChatError::EmptyMessage)));
        }
    };

    let store = ChatPermissionRepository::new(state.pool());
    let resolver = RoleResolver::new(state.clerk(), &store);
    let generator = FallbackClient::new(state.generation_backend(), state.models());
    let chat = ChatService::new(&resolver, &generator);

    let result = chat.send_message(Some(&identity), &request.message).await;
    match &result {
        Err(e @ ChatError::Generation(_)) => {
            let event_id = sentry::capture_error(e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Chat generation failed");
        }
        Err(e) => tracing::info!(error = %e, "Chat message rejected"),
        Ok(_) => {}
    }

    Json(result.into())
}
