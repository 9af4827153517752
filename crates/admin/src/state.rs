//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clerk::{ClerkClient, ClerkError, SessionVerifier};
use crate::config::AdminConfig;
use crate::gemini::{GeminiClient, GeminiError};
use crate::ports::GenerationBackend;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("clerk configuration: {0}")]
    Clerk(#[from] ClerkError),
    #[error("gemini configuration: {0}")]
    Gemini(#[from] GeminiError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    clerk: ClerkClient,
    sessions: SessionVerifier,
    gemini: Option<GeminiClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The Gemini client is only built when an API key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the Clerk URL or session key, or the Gemini URL,
    /// is invalid.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let clerk = ClerkClient::new(&config.clerk)?;
        let sessions = SessionVerifier::from_rsa_pem(&config.clerk.jwt_public_key)?;
        let gemini = config
            .gemini
            .api_key
            .clone()
            .map(|key| GeminiClient::new(key, &config.gemini.api_url))
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                clerk,
                sessions,
                gemini,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Clerk Backend API client.
    #[must_use]
    pub fn clerk(&self) -> &ClerkClient {
        &self.inner.clerk
    }

    /// Get a reference to the session token verifier.
    #[must_use]
    pub fn sessions(&self) -> &SessionVerifier {
        &self.inner.sessions
    }

    /// Get the generation backend, if an API key is configured.
    #[must_use]
    pub fn generation_backend(&self) -> Option<&dyn GenerationBackend> {
        self.inner
            .gemini
            .as_ref()
            .map(|client| client as &dyn GenerationBackend)
    }

    /// Candidate models, highest priority first.
    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.inner.config.gemini.models
    }
}
