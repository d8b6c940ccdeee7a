//! Unified error type for the clerk engine.
//!
//! Conversational failures (remote outages, iteration-bound exhaustion,
//! unresolvable references) are not errors: they surface as replies per the
//! engine's contract. `ClerkError` covers construction-time failures only.

use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;

/// Errors that can occur while building or wiring the clerk engine.
#[derive(Debug, Error)]
pub enum ClerkError {
    /// Configuration loading failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Remote model client failed.
    #[error("model error: {0}")]
    Llm(#[from] LlmError),
}
