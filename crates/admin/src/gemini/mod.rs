//! Gemini API integration for the chat feature.
//!
//! One [`GeminiClient::generate`] call targets exactly one model; choosing
//! between models is the job of
//! [`FallbackClient`](crate::services::generation::FallbackClient).

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::{ApiErrorResponse, GeminiError};
pub use types::{Content, GenerateContentRequest, GenerateContentResponse, Part};
