//! Error types for the Clerk integration.

use thiserror::Error;

/// Errors that can occur when talking to Clerk or verifying its tokens.
#[derive(Debug, Error)]
pub enum ClerkError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Clerk Backend API returned an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Session token is missing, malformed, expired or has a bad signature.
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Session token has no usable `sub` claim.
    #[error("session token has no subject")]
    MissingSubject,

    /// Configured base URL or user ID does not form a valid URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
