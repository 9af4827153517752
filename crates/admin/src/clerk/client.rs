//! Clerk Backend API client.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use clerk_admin_core::UserId;

use crate::config::ClerkConfig;
use crate::models::UserProfile;
use crate::ports::IdentityProvider;

use super::error::ClerkError;
use super::types::{ClerkApiErrorResponse, ClerkUser};

/// Clerk Backend API client.
///
/// Cheap to clone; the HTTP client and credentials are shared.
#[derive(Clone)]
pub struct ClerkClient {
    inner: Arc<ClerkClientInner>,
}

struct ClerkClientInner {
    client: reqwest::Client,
    api_url: Url,
    secret_key: SecretString,
}

impl ClerkClient {
    /// Create a new Clerk client.
    ///
    /// # Errors
    ///
    /// Returns `ClerkError::Url` if the configured API URL is invalid, or
    /// `ClerkError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClerkConfig) -> Result<Self, ClerkError> {
        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(ClerkError::Parse(format!(
                "CLERK_API_URL cannot be used as a base: {api_url}"
            )));
        }

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ClerkClientInner {
                client,
                api_url,
                secret_key: config.secret_key.clone(),
            }),
        })
    }

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API responds with a
    /// non-success status, or the body cannot be parsed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: &UserId) -> Result<ClerkUser, ClerkError> {
        let url = self.user_url(user_id)?;

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ClerkApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message())
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), "Clerk API error: {message}");
            return Err(ClerkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ClerkUser>()
            .await
            .map_err(|e| ClerkError::Parse(e.to_string()))
    }

    /// Build `{api_url}/users/{id}` with the ID percent-encoded as one segment.
    fn user_url(&self, user_id: &UserId) -> Result<Url, ClerkError> {
        let mut url = self.inner.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClerkError::Parse("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("users")
            .push(user_id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, ClerkError> {
        let user = self.get_user(user_id).await?;
        Ok(UserProfile {
            private_role: user.private_role(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> ClerkConfig {
        ClerkConfig {
            secret_key: SecretString::from("sk_test_abc"),
            jwt_public_key: String::new(),
            api_url: api_url.to_string(),
            sign_in_url: "/sign-in".to_string(),
        }
    }

    #[test]
    fn test_user_url() {
        let client = ClerkClient::new(&config("https://api.clerk.com/v1")).unwrap();
        let url = client.user_url(&UserId::parse("user_2abc").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://api.clerk.com/v1/users/user_2abc");
    }

    #[test]
    fn test_user_url_with_trailing_slash_and_escaping() {
        let client = ClerkClient::new(&config("https://api.clerk.com/v1/")).unwrap();
        let url = client.user_url(&UserId::parse("a/b").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://api.clerk.com/v1/users/a%2Fb");
    }

    #[test]
    fn test_invalid_api_url() {
        assert!(ClerkClient::new(&config("not a url")).is_err());
    }

    #[tokio::test]
    #[ignore = "Opens a TCP connection to 127.0.0.1:9"]
    async fn test_unreachable_api_is_an_error() {
        let client = ClerkClient::new(&config("http://127.0.0.1:9")).unwrap();
        let result = client
            .fetch_profile(&UserId::parse("user_2abc").unwrap())
            .await;
        assert!(matches!(result, Err(ClerkError::Http(_))));
    }
}
