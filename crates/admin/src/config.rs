//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL of the app
//! - `CLERK_SECRET_KEY` - Clerk Backend API secret key
//! - `CLERK_JWT_KEY` - PEM-encoded public key used to verify Clerk session tokens
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `CLERK_API_URL` - Clerk Backend API base (default: <https://api.clerk.com/v1>)
//! - `CLERK_SIGN_IN_URL` - Where unauthenticated page requests are sent (default: /sign-in)
//! - `GEMINI_API_KEY` - Gemini API key (chat is unavailable without it)
//! - `GEMINI_API_URL` - Gemini API base (default: <https://generativelanguage.googleapis.com/v1beta>)
//! - `GEMINI_MODELS` - Comma-separated candidate models, highest priority first
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com/v1";
const DEFAULT_SIGN_IN_URL: &str = "/sign-in";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Candidate models, highest priority first.
///
/// Later entries are fallbacks only; the order reflects preference, not
/// availability.
pub const DEFAULT_GEMINI_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-2.0-flash-exp",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
    "gemini-pro",
];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the app
    pub base_url: String,
    /// Clerk identity provider configuration
    pub clerk: ClerkConfig,
    /// Gemini configuration (optional - chat fails with a configuration error without it)
    pub gemini: GeminiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Clerk identity provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct ClerkConfig {
    /// Backend API secret key (`sk_live_...`)
    pub secret_key: SecretString,
    /// PEM public key for session token verification
    pub jwt_public_key: String,
    /// Backend API base URL
    pub api_url: String,
    /// Sign-in page for unauthenticated page requests
    pub sign_in_url: String,
}

impl std::fmt::Debug for ClerkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkConfig")
            .field("secret_key", &"[REDACTED]")
            .field("jwt_public_key", &"[PUBLIC KEY]")
            .field("api_url", &self.api_url)
            .field("sign_in_url", &self.sign_in_url)
            .finish()
    }
}

/// Gemini API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; `None` when `GEMINI_API_KEY` is unset
    pub api_key: Option<SecretString>,
    /// API base URL
    pub api_url: String,
    /// Candidate models, highest priority first
    pub models: Vec<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("models", &self.models)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;

        let clerk = ClerkConfig::from_env()?;
        let gemini = GeminiConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            clerk,
            gemini,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the Clerk configuration.
    #[must_use]
    pub const fn clerk(&self) -> &ClerkConfig {
        &self.clerk
    }
}

impl ClerkConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_public_key = get_required_env("CLERK_JWT_KEY")?;
        if !jwt_public_key.contains("BEGIN PUBLIC KEY") {
            return Err(ConfigError::InvalidEnvVar(
                "CLERK_JWT_KEY".to_string(),
                "must be a PEM-encoded public key".to_string(),
            ));
        }

        Ok(Self {
            secret_key: get_validated_secret("CLERK_SECRET_KEY")?,
            jwt_public_key,
            api_url: get_env_or_default("CLERK_API_URL", DEFAULT_CLERK_API_URL),
            sign_in_url: get_env_or_default("CLERK_SIGN_IN_URL", DEFAULT_SIGN_IN_URL),
        })
    }
}

impl GeminiConfig {
    /// Load Gemini configuration from environment.
    ///
    /// A missing `GEMINI_API_KEY` is not fatal: the app starts and chat
    /// requests fail with a configuration error instead.
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_optional_env("GEMINI_API_KEY").map(|key| {
            if let Err(e) = validate_secret_strength(&key, "GEMINI_API_KEY") {
                tracing::warn!("GEMINI_API_KEY validation warning: {e}");
            }
            SecretString::from(key)
        });
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set. Gemini features will not work.");
        }

        let models = match get_optional_env("GEMINI_MODELS") {
            Some(raw) => parse_model_list(&raw)?,
            None => DEFAULT_GEMINI_MODELS.iter().map(|m| (*m).to_string()).collect(),
        };

        Ok(Self {
            api_key,
            api_url: get_env_or_default("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            models,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a comma-separated model list, preserving order and dropping blanks.
fn parse_model_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
        .collect();

    if models.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "GEMINI_MODELS".to_string(),
            "must list at least one model".to_string(),
        ));
    }
    Ok(models)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
