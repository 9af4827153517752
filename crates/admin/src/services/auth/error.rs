//! Authorization error types.

use thiserror::Error;

/// Errors raised by [`super::RoleResolver::require_admin`].
///
/// Read-only checks never produce these; only privileged mutations do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No signed-in identity.
    #[error("authentication required")]
    Unauthenticated,

    /// Signed in, but the resolved role is not `admin`.
    #[error("admin access required")]
    Forbidden,
}
