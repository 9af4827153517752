//! Generation connectivity test for admins.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::middleware::RequireAdmin;
use crate::services::FallbackClient;
use crate::state::AppState;

/// Prompt used by the GET variant.
const GREETING_PROMPT: &str = "Hello! Please introduce yourself in one sentence.";

/// Request with a custom prompt.
#[derive(Debug, Deserialize)]
pub struct TestPromptRequest {
    pub prompt: Option<String>,
}

/// Build the test router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/test-gemini", get(test_greeting).post(test_prompt))
}

/// Run a fixed greeting through the fallback chain.
///
/// GET /api/test-gemini
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn test_greeting(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
) -> Response {
    run(&state, GREETING_PROMPT).await
}

/// Run a custom prompt through the fallback chain.
///
/// POST /api/test-gemini
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn test_prompt(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Json(request): Json<TestPromptRequest>,
) -> Response {
    let Some(prompt) = request.prompt.filter(|p| !p.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Prompt is required and must be a string" })),
        )
            .into_response();
    };

    run(&state, &prompt).await
}

async fn run(state: &AppState, prompt: &str) -> Response {
    let client = FallbackClient::new(state.generation_backend(), state.models());

    match client.generate_response(prompt).await {
        Ok(result) => Json(json!({ "success": true, "data": result })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Gemini test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
