//! Gemini API client.
//!
//! Non-streaming `generateContent` calls against a caller-chosen model.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use crate::ports::GenerationBackend;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    api_url: Url,
    api_key: SecretString,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::Url` if `api_url` is invalid, or
    /// `GeminiError::Http` if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, api_url: &str) -> Result<Self, GeminiError> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(GeminiError::Parse(format!(
                "GEMINI_API_URL cannot be used as a base: {api_url}"
            )));
        }

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                api_url,
                api_key,
            }),
        })
    }

    /// Generate text for `prompt` with one model.
    ///
    /// Returns the concatenated text of the first candidate, which may be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API responds with a
    /// non-success status, or the body cannot be parsed.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let url = self.generate_url(model)?;
        let request = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .inner
            .client
            .post(url)
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        Ok(body.text())
    }

    /// Build `{api_url}/models/{model}:generateContent`.
    fn generate_url(&self, model: &str) -> Result<Url, GeminiError> {
        let mut url = self.inner.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GeminiError::Parse("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("models")
            .push(&format!("{model}:generateContent"));
        Ok(url)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        self.generate(model, prompt).await
    }
}
