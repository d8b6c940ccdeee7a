//! Clerk configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GROQ_API_KEY` - Groq API key (`gsk_...`). The documented placeholder
//!   `your_groq_api_key_here` is accepted at load time but flags the engine
//!   as not configured, so callers get an explicit "not configured" reply
//!   instead of a failed network call.
//!
//! ## Optional
//! - `CLERK_MODEL` - Tool-calling model ID
//!   (default: meta-llama/llama-4-scout-17b-16e-instruct)
//! - `CLERK_FALLBACK_MODEL` - Text-only fallback model ID
//!   (default: llama-3.1-8b-instant)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
const DEFAULT_FALLBACK_MODEL: &str = "llama-3.1-8b-instant";

/// The placeholder shipped in `.env.example`; never a real key.
pub const PLACEHOLDER_API_KEY: &str = "your_groq_api_key_here";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Clerk engine configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClerkConfig {
    /// Groq API key.
    pub api_key: SecretString,
    /// Model used for the tool-calling loop.
    pub model: String,
    /// Reduced-capability model used when tool calling is rejected.
    pub fallback_model: String,
}

impl std::fmt::Debug for ClerkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}

impl ClerkConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `GROQ_API_KEY` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()))?;

        let model = std::env::var("CLERK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let fallback_model = std::env::var("CLERK_FALLBACK_MODEL")
            .unwrap_or_else(|_| DEFAULT_FALLBACK_MODEL.to_string());

        Ok(Self {
            api_key: api_key.into(),
            model,
            fallback_model,
        })
    }

    /// Build a config directly, for tests and embedding callers.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().into(),
            model: DEFAULT_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
        }
    }

    /// Whether a usable API key is present.
    ///
    /// The placeholder sentinel and the empty string both count as not
    /// configured; the engine must answer with an explicit setup hint
    /// instead of attempting a remote call.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let key = self.api_key.expose_secret();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}
