//! Admin console route handlers.
//!
//! All routes require the `admin` role. The extractor's verified
//! [`AdminIdentity`] is handed to [`ChatPermissionService`], so each request
//! resolves the role once.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ChatPermissionRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::ChatPermission;
use crate::services::{AdminIdentity, ChatPermissionService, PermissionAdminError};
use crate::state::AppState;

use super::dashboard::UserView;
use super::{Flash, render};

const PERMISSIONS_PATH: &str = "/admin/chat-permissions";

// =============================================================================
// Templates
// =============================================================================

/// Permission row for templates.
#[derive(Debug, Clone)]
pub struct PermissionView {
    pub user_id: String,
    pub enabled: bool,
    pub granted_at: String,
    pub granted_by: String,
    pub notes: String,
}

impl From<ChatPermission> for PermissionView {
    fn from(permission: ChatPermission) -> Self {
        Self {
            user_id: permission.user_id.to_string(),
            enabled: permission.enabled,
            granted_at: permission.granted_at.format("%Y-%m-%d %H:%M").to_string(),
            granted_by: permission
                .granted_by
                .map_or_else(|| "-".to_string(), String::from),
            notes: permission.notes.unwrap_or_default(),
        }
    }
}

/// Admin landing template.
#[derive(Template)]
#[template(path = "admin/index.html")]
struct AdminIndexTemplate {
    user: UserView,
    current_path: String,
    flash: Flash,
    enabled_count: usize,
    total_count: usize,
    models: Vec<String>,
}

/// Chat permission table template.
#[derive(Template)]
#[template(path = "admin/chat_permissions.html")]
struct ChatPermissionsTemplate {
    user: UserView,
    current_path: String,
    flash: Flash,
    permissions: Vec<PermissionView>,
}

// =============================================================================
// Request Types
// =============================================================================

/// Form for granting chat access.
#[derive(Debug, Deserialize)]
pub struct GrantForm {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub notes: Option<String>,
}

/// Form for revoking chat access.
#[derive(Debug, Deserialize)]
pub struct RevokeForm {
    #[serde(rename = "userId")]
    pub user_id: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route(PERMISSIONS_PATH, get(chat_permissions))
        .route("/admin/chat-permissions/grant", post(grant))
        .route("/admin/chat-permissions/revoke", post(revoke))
}

fn admin_view(admin: &AdminIdentity) -> UserView {
    UserView {
        user_id: admin.user_id.to_string(),
        is_admin: true,
    }
}

/// Admin landing page.
///
/// GET /admin
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn index(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
) -> Result<Html<String>, AppError> {
    let store = ChatPermissionRepository::new(state.pool());
    let permissions = ChatPermissionService::new(state.clerk(), &store)
        .list_as(&identity)
        .await?;

    let template = AdminIndexTemplate {
        user: admin_view(&identity),
        current_path: "/admin".to_string(),
        flash: Flash::default(),
        enabled_count: permissions.iter().filter(|p| p.enabled).count(),
        total_count: permissions.len(),
        models: state.models().to_vec(),
    };

    Ok(render(&template))
}

/// Chat permission table.
///
/// GET /admin/chat-permissions
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn chat_permissions(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Query(flash): Query<Flash>,
) -> Result<Html<String>, AppError> {
    let store = ChatPermissionRepository::new(state.pool());
    let permissions = ChatPermissionService::new(state.clerk(), &store)
        .list_as(&identity)
        .await?;

    let template = ChatPermissionsTemplate {
        user: admin_view(&identity),
        current_path: PERMISSIONS_PATH.to_string(),
        flash,
        permissions: permissions.into_iter().map(PermissionView::from).collect(),
    };

    Ok(render(&template))
}

/// Grant chat access.
///
/// POST /admin/chat-permissions/grant
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn grant(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Form(form): Form<GrantForm>,
) -> Result<Redirect, AppError> {
    let store = ChatPermissionRepository::new(state.pool());
    let service = ChatPermissionService::new(state.clerk(), &store);

    match service
        .grant_as(&identity, &form.user_id, form.notes.as_deref())
        .await
    {
        Ok(record) => Ok(Flash::success(
            PERMISSIONS_PATH,
            &format!("Chat access granted to {}.", record.user_id),
        )),
        Err(e) => mutation_failed(e),
    }
}

/// Revoke chat access.
///
/// POST /admin/chat-permissions/revoke
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn revoke(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    Form(form): Form<RevokeForm>,
) -> Result<Redirect, AppError> {
    let store = ChatPermissionRepository::new(state.pool());
    let service = ChatPermissionService::new(state.clerk(), &store);

    match service.revoke_as(&identity, &form.user_id).await {
        Ok(true) => Ok(Flash::success(
            PERMISSIONS_PATH,
            &format!("Chat access revoked for {}.", form.user_id.trim()),
        )),
        Ok(false) => Ok(Flash::success(
            PERMISSIONS_PATH,
            &format!("No chat permission record for {}.", form.user_id.trim()),
        )),
        Err(e) => mutation_failed(e),
    }
}

/// Turn a failed grant/revoke into a flash message, or an error page for
/// authorization failures.
fn mutation_failed(err: PermissionAdminError) -> Result<Redirect, AppError> {
    match err {
        PermissionAdminError::InvalidUserId(_) => {
            Ok(Flash::error(PERMISSIONS_PATH, "User ID is required."))
        }
        PermissionAdminError::Store(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Chat permission update failed");
            Ok(Flash::error(
                PERMISSIONS_PATH,
                "Failed to update chat permissions.",
            ))
        }
        PermissionAdminError::Auth(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::test_support::user;

    #[test]
    fn test_permission_view() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let view = PermissionView::from(ChatPermission {
            user_id: user("user_1"),
            enabled: false,
            granted_at: at,
            granted_by: None,
            notes: None,
            updated_at: at,
        });
        assert_eq!(view.user_id, "user_1");
        assert!(!view.enabled);
        assert_eq!(view.granted_at, "2026-03-01 09:30");
        assert_eq!(view.granted_by, "-");
        assert_eq!(view.notes, "");
    }
}
