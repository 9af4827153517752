//! Ordered model fallback for text generation.
//!
//! Candidates are tried strictly in order, one attempt each, with no delay
//! between them. The first candidate that returns non-empty text wins.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::ports::GenerationBackend;

/// Message recorded when a model answers with no text.
const EMPTY_RESPONSE: &str = "empty response from API";

/// Errors from [`FallbackClient::generate_response`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No backend is configured.
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,

    /// The candidate list is empty.
    #[error("no candidate models configured")]
    NoCandidates,

    /// Every candidate failed.
    #[error("all models failed. tried: {}. last error: {last_error}", tried.join(", "))]
    AllModelsFailed {
        /// Every candidate, in the order tried.
        tried: Vec<String>,
        /// Message of the final candidate's failure.
        last_error: String,
    },
}

/// A successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Generated text, never empty.
    pub text: String,
    /// Model that produced `text`.
    pub model: String,
    /// Models that failed before `model`, in order.
    pub tried_models: Vec<String>,
}

/// Runs a prompt through an ordered list of candidate models.
pub struct FallbackClient<'a> {
    backend: Option<&'a dyn GenerationBackend>,
    models: &'a [String],
}

impl<'a> FallbackClient<'a> {
    /// Create a fallback client.
    ///
    /// `backend` is `None` when no API key is configured; every call then fails
    /// with `GenerationError::MissingApiKey`.
    #[must_use]
    pub const fn new(backend: Option<&'a dyn GenerationBackend>, models: &'a [String]) -> Self {
        Self { backend, models }
    }

    /// Generate a response, falling back through the candidate models.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingApiKey` without a backend,
    /// `GenerationError::NoCandidates` for an empty model list, and
    /// `GenerationError::AllModelsFailed` once every candidate has failed.
    #[instrument(skip_all, fields(prompt_len = prompt.len(), candidates = self.models.len()))]
    pub async fn generate_response(
        &self,
        prompt: &str,
    ) -> Result<GenerationResponse, GenerationError> {
        let backend = self.backend.ok_or(GenerationError::MissingApiKey)?;

        let mut tried = Vec::with_capacity(self.models.len());
        let mut last_error = None;

        for model in self.models {
            let error = match backend.invoke(model, prompt).await {
                Ok(text) if !text.is_empty() => {
                    tracing::info!(model = %model, failed = tried.len(), "Generation succeeded");
                    return Ok(GenerationResponse {
                        text,
                        model: model.clone(),
                        tried_models: tried,
                    });
                }
                Ok(_) => EMPTY_RESPONSE.to_string(),
                Err(e) => e.to_string(),
            };

            tracing::warn!(model = %model, error = %error, "Model failed, trying next candidate");
            tried.push(model.clone());
            last_error = Some(error);
        }

        match last_error {
            Some(last_error) => {
                tracing::error!(tried = ?tried, "All candidate models failed");
                Err(GenerationError::AllModelsFailed { tried, last_error })
            }
            None => Err(GenerationError::NoCandidates),
        }
    }
}
