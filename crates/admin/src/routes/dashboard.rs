//! Dashboard route handler.

use askama::Template;
use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};
use tracing::instrument;

use clerk_admin_core::Role;

use crate::db::ChatPermissionRepository;
use crate::filters;
use crate::middleware::RequireIdentity;
use crate::models::Identity;
use crate::services::RoleResolver;
use crate::state::AppState;

use super::{Flash, render};

/// Signed-in user view for templates.
#[derive(Debug, Clone)]
pub struct UserView {
    pub user_id: String,
    pub is_admin: bool,
}

impl UserView {
    /// Build the view, resolving whether the user is an admin.
    pub async fn resolve(state: &AppState, identity: &Identity) -> Self {
        let store = ChatPermissionRepository::new(state.pool());
        let resolver = RoleResolver::new(state.clerk(), &store);
        Self {
            user_id: identity.user_id.to_string(),
            is_admin: resolver.is_admin(Some(identity)).await,
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: UserView,
    pub current_path: String,
    pub flash: Flash,
    pub role: String,
    pub chat_enabled: bool,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Render the dashboard.
///
/// Role lookups fail closed, so an identity provider outage shows "none"
/// instead of an error page.
///
/// GET /dashboard
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn dashboard(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Html<String> {
    let store = ChatPermissionRepository::new(state.pool());
    let resolver = RoleResolver::new(state.clerk(), &store);

    let role = resolver.resolve_role(Some(&identity)).await;
    let chat_enabled = resolver.check_chat_permission(Some(&identity)).await;

    let template = DashboardTemplate {
        user: UserView {
            user_id: identity.user_id.to_string(),
            is_admin: role.as_ref().is_some_and(Role::is_admin),
        },
        current_path: "/dashboard".to_string(),
        flash: Flash::default(),
        role: role.map_or_else(|| "none".to_string(), String::from),
        chat_enabled,
    };

    render(&template)
}
