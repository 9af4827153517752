//! Session token extraction and verification.
//!
//! Verification is purely local (signature + expiry against the configured
//! PEM key), so reading claims never costs a network round trip.

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use clerk_admin_core::UserId;

use crate::models::{Identity, SessionClaims};

use super::error::ClerkError;

/// Cookie Clerk's frontend SDK stores the session token in.
pub const SESSION_COOKIE_NAME: &str = "__session";

/// Clock skew tolerated when checking `exp`/`nbf`, in seconds.
const LEEWAY_SECONDS: u64 = 5;

/// Verifies Clerk session tokens.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    /// Create a verifier from a PEM-encoded RSA public key.
    ///
    /// # Errors
    ///
    /// Returns `ClerkError::InvalidToken` if the key cannot be parsed.
    pub fn from_rsa_pem(pem: &str) -> Result<Self, ClerkError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = LEEWAY_SECONDS;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self { key, validation })
    }

    /// Verify a session token and turn it into an [`Identity`].
    ///
    /// # Errors
    ///
    /// Returns `ClerkError::InvalidToken` for bad signatures, expired tokens or
    /// malformed input, and `ClerkError::MissingSubject` if `sub` is blank.
    pub fn verify(&self, token: &str) -> Result<Identity, ClerkError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        let user_id = claims
            .get("sub")
            .and_then(serde_json::Value::as_str)
            .and_then(|sub| UserId::parse(sub).ok())
            .ok_or(ClerkError::MissingSubject)?;

        Ok(Identity::new(user_id).with_claims(claims))
    }
}

/// Find the session token in a request.
///
/// A bearer token takes precedence over the `__session` cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
