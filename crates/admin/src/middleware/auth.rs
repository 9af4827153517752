//! Authentication extractors for admin.
//!
//! The identity comes from the Clerk session token (bearer header or
//! `__session` cookie), verified locally against the configured key.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::clerk::session_token;
use crate::db::ChatPermissionRepository;
use crate::error::set_sentry_user;
use crate::models::Identity;
use crate::services::{AdminIdentity, AuthError, RoleResolver};
use crate::state::AppState;

/// Where non-admins are sent when they open an admin page.
const NON_ADMIN_REDIRECT: &str = "/dashboard";

/// Verify the request's session token, if any.
fn identity_from_parts(parts: &Parts, state: &AppState) -> Option<Identity> {
    let token = session_token(&parts.headers)?;
    match state.sessions().verify(&token) {
        Ok(identity) => {
            set_sentry_user(identity.user_id.as_str());
            Some(identity)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            None
        }
    }
}

fn is_api_request(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
}

/// Extractor that optionally gets the signed-in identity.
///
/// Missing, expired or forged tokens all yield `None`.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_from_parts(parts, state)))
    }
}

/// Rejection for the authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the sign-in page (for HTML requests).
    RedirectToSignIn(String),
    /// Redirect signed-in non-admins away from admin pages.
    RedirectToDashboard,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Forbidden response (for API requests).
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn(url) => Redirect::to(&url).into_response(),
            Self::RedirectToDashboard => Redirect::to(NON_ADMIN_REDIRECT).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": AuthError::Unauthenticated.to_string() })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": AuthError::Forbidden.to_string() })),
            )
                .into_response(),
        }
    }
}

impl AuthRejection {
    fn unauthenticated(parts: &Parts, state: &AppState) -> Self {
        if is_api_request(parts) {
            Self::Unauthorized
        } else {
            Self::RedirectToSignIn(state.config().clerk.sign_in_url.clone())
        }
    }

    fn forbidden(parts: &Parts) -> Self {
        if is_api_request(parts) {
            Self::Forbidden
        } else {
            Self::RedirectToDashboard
        }
    }
}

/// Extractor that requires a signed-in identity.
///
/// HTML requests without one are redirected to sign in; `/api/` requests get
/// 401 Unauthorized.
pub struct RequireIdentity(pub Identity);

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts, state)
            .map(Self)
            .ok_or_else(|| AuthRejection::unauthenticated(parts, state))
    }
}

/// Extractor that requires an admin.
///
/// Signed-in users without the `admin` role are redirected to the dashboard,
/// or get 403 Forbidden on `/api/` routes. Handlers pass the verified
/// [`AdminIdentity`] on instead of resolving the role again.
pub struct RequireAdmin(pub AdminIdentity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = identity_from_parts(parts, state)
            .ok_or_else(|| AuthRejection::unauthenticated(parts, state))?;

        let store = ChatPermissionRepository::new(state.pool());
        let resolver = RoleResolver::new(state.clerk(), &store);
        match resolver.require_admin(Some(&identity)).await {
            Ok(admin) => Ok(Self(admin)),
            Err(AuthError::Unauthenticated) => Err(AuthRejection::unauthenticated(parts, state)),
            Err(AuthError::Forbidden) => {
                tracing::info!(user_id = %identity.user_id, "Non-admin denied admin route");
                Err(AuthRejection::forbidden(parts))
            }
        }
    }
}
