//! Custom error types for the dialogue controller.

use thiserror::Error;

/// Unified error type propagated through every stage of a conversation turn.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The generation backend rejected the currently bound configuration.
    /// Recovered exactly once by rebuilding the session binding.
    #[error("Stale session binding: {0}")]
    StaleSession(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Whether this error qualifies for the one-shot stale-binding retry.
    pub fn is_stale_session(&self) -> bool {
        matches!(self, AssistantError::StaleSession(_))
    }
}
