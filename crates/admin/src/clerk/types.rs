//! Types for the Clerk Backend API.

use serde::Deserialize;

/// A user as returned by `GET /users/{id}`.
///
/// Only the fields this app reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkUser {
    /// Clerk user ID.
    pub id: String,
    /// Server-only metadata (holds the role).
    #[serde(default)]
    pub private_metadata: serde_json::Map<String, serde_json::Value>,
}

impl ClerkUser {
    /// The role from private metadata, if set to a non-empty string.
    #[must_use]
    pub fn private_role(&self) -> Option<String> {
        self.private_metadata
            .get("role")
            .and_then(serde_json::Value::as_str)
            .filter(|role| !role.is_empty())
            .map(ToString::to_string)
    }
}

/// Error body returned by the Clerk Backend API.
#[derive(Debug, Deserialize)]
pub struct ClerkApiErrorResponse {
    /// One or more errors.
    #[serde(default)]
    pub errors: Vec<ClerkApiError>,
}

/// A single API error entry.
#[derive(Debug, Deserialize)]
pub struct ClerkApiError {
    /// Short message.
    pub message: String,
    /// Longer explanation, when present.
    pub long_message: Option<String>,
    /// Machine-readable code.
    pub code: Option<String>,
}

impl ClerkApiErrorResponse {
    /// Best human-readable message from the first error.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.errors
            .first()
            .map(|e| e.long_message.clone().unwrap_or_else(|| e.message.clone()))
    }
}
