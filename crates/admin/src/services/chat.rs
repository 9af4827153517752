//! Chat message handling.
//!
//! Validates the message, checks chat permission, then runs the prompt
//! through the model fallback chain.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::models::Identity;

use super::auth::RoleResolver;
use super::generation::{FallbackClient, GenerationError};

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Shown instead of errors that would reveal credential configuration.
const CONFIGURATION_ERROR: &str = "System configuration error.";

/// Errors from [`ChatService::send_message`].
#[derive(Debug, Error)]
pub enum ChatError {
    /// Message is empty or whitespace.
    #[error("Please enter a message.")]
    EmptyMessage,

    /// Message exceeds [`MAX_MESSAGE_LENGTH`].
    #[error("Messages can be at most {max} characters.")]
    MessageTooLong {
        /// Limit that was exceeded.
        max: usize,
    },

    /// The user has no chat permission.
    #[error("You do not have permission to use the chatbot.")]
    PermissionDenied,

    /// Generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl ChatError {
    /// Message safe to show the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.contains("API_KEY") {
            CONFIGURATION_ERROR.to_string()
        } else {
            message
        }
    }
}

/// JSON body returned by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<String, ChatError>> for SendMessageResult {
    fn from(result: Result<String, ChatError>) -> Self {
        match result {
            Ok(response) => Self {
                success: true,
                response: Some(response),
                error: None,
            },
            Err(e) => Self {
                success: false,
                response: None,
                error: Some(e.user_message()),
            },
        }
    }
}

/// Chat service.
pub struct ChatService<'a> {
    resolver: &'a RoleResolver<'a>,
    generator: &'a FallbackClient<'a>,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(resolver: &'a RoleResolver<'a>, generator: &'a FallbackClient<'a>) -> Self {
        Self {
            resolver,
            generator,
        }
    }

    /// Answer a chat message for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::EmptyMessage` or `ChatError::MessageTooLong` for
    /// invalid input, `ChatError::PermissionDenied` if the user may not chat,
    /// and `ChatError::Generation` if no model produced a response.
    #[instrument(skip_all, fields(user_id = identity.map(|i| i.user_id.as_str()), message_len = message.len()))]
    pub async fn send_message(
        &self,
        identity: Option<&Identity>,
        message: &str,
    ) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::MessageTooLong {
                max: MAX_MESSAGE_LENGTH,
            });
        }

        if !self.resolver.check_chat_permission(identity).await {
            return Err(ChatError::PermissionDenied);
        }

        let response = self.generator.generate_response(message).await?;
        Ok(response.text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{
        FakeIdentityProvider, InMemoryPermissionStore, Outcome, ScriptedBackend, identity,
    };

    fn models() -> Vec<String> {
        vec!["primary".to_string(), "backup".to_string()]
    }

    #[tokio::test]
    async fn test_permitted_user_gets_reply() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::with_permission("user_1", true);
        let backend = ScriptedBackend::new(&[("backup", Outcome::Text("hi there"))]);
        let models = models();
        let resolver = RoleResolver::new(&provider, &store);
        let generator = FallbackClient::new(Some(&backend), &models);
        let chat = ChatService::new(&resolver, &generator);

        let id = identity("user_1", json!({ "metadata": { "role": "user" } }));
        let reply = chat.send_message(Some(&id), "hello").await.unwrap();
        assert_eq!(reply, "hi there");
        assert_eq!(backend.invoked(), ["primary", "backup"]);
    }

    #[tokio::test]
    async fn test_validation_runs_before_permission_check() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let backend = ScriptedBackend::default();
        let models = models();
        let resolver = RoleResolver::new(&provider, &store);
        let generator = FallbackClient::new(Some(&backend), &models);
        let chat = ChatService::new(&resolver, &generator);

        let id = identity("user_1", json!({}));
        assert!(matches!(
            chat.send_message(Some(&id), "  \n ").await,
            Err(ChatError::EmptyMessage)
        ));
        assert!(matches!(
            chat.send_message(Some(&id), &"x".repeat(MAX_MESSAGE_LENGTH + 1)).await,
            Err(ChatError::MessageTooLong { max: 1000 })
        ));
        assert_eq!(provider.calls(), 0);
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_length_counts_characters() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let backend = ScriptedBackend::new(&[("primary", Outcome::Text("ok"))]);
        let models = models();
        let resolver = RoleResolver::new(&provider, &store);
        let generator = FallbackClient::new(Some(&backend), &models);
        let chat = ChatService::new(&resolver, &generator);

        let admin = identity("user_a", json!({ "metadata": { "role": "admin" } }));
        let message = "안".repeat(MAX_MESSAGE_LENGTH);
        assert_eq!(chat.send_message(Some(&admin), &message).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_permission_denied_skips_generation() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::with_permission("user_1", false);
        let backend = ScriptedBackend::new(&[("primary", Outcome::Text("ok"))]);
        let models = models();
        let resolver = RoleResolver::new(&provider, &store);
        let generator = FallbackClient::new(Some(&backend), &models);
        let chat = ChatService::new(&resolver, &generator);

        let id = identity("user_1", json!({ "metadata": { "role": "user" } }));
        let err = chat.send_message(Some(&id), "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::PermissionDenied));
        assert!(backend.invoked().is_empty());
    }

    #[test]
    fn test_missing_api_key_is_masked() {
        let err = ChatError::Generation(GenerationError::MissingApiKey);
        assert_eq!(err.user_message(), "System configuration error.");
    }

    #[test]
    fn test_other_errors_are_shown() {
        let err = ChatError::Generation(GenerationError::AllModelsFailed {
            tried: vec!["primary".to_string()],
            last_error: "quota exceeded".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "all models failed. tried: primary. last error: quota exceeded"
        );
    }

    #[test]
    fn test_send_message_result_json() {
        let ok = serde_json::to_value(SendMessageResult::from(Ok("hi".to_string()))).unwrap();
        assert_eq!(ok, json!({ "success": true, "response": "hi" }));

        let err = serde_json::to_value(SendMessageResult::from(Err(ChatError::PermissionDenied)))
            .unwrap();
        assert_eq!(
            err,
            json!({
                "success": false,
                "error": "You do not have permission to use the chatbot."
            })
        );
    }
}
