//! Configuration loading from environment variables via dotenvy.
//! No values are ever hardcoded here.

use crate::error::AssistantError;

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key — sourced from `GROQ_API_KEY`
    pub groq_api_key: String,
    /// Base URL for the Groq API — sourced from `GROQ_BASE_URL`
    pub groq_base_url: String,
    /// Generation model identifier — sourced from `GROQ_MODEL`
    pub groq_model: String,
    /// Base URL of the vector-search service — sourced from `RETRIEVER_BASE_URL`
    pub retriever_base_url: String,
    /// TCP port for the HTTP API — sourced from `SERVER_PORT`
    pub server_port: u16,
}

/// Load configuration purely from already-set environment variables.
///
/// Does **not** call `dotenvy::dotenv()` — useful in tests that need to
/// control the env precisely via [`std::env::set_var`] / [`std::env::remove_var`].
///
/// # Errors
/// Returns [`AssistantError::Config`] if required variables are missing or invalid.
pub fn load_config_from_env() -> Result<Config, AssistantError> {
    let api_key = std::env::var("GROQ_API_KEY")
        .map_err(|_| AssistantError::Config("GROQ_API_KEY not set".to_string()))?;

    if api_key.is_empty() {
        return Err(AssistantError::Config("GROQ_API_KEY is empty".to_string()));
    }

    let groq_base_url = std::env::var("GROQ_BASE_URL")
        .unwrap_or_else(|_| "https://api.groq.com".to_string());

    if !groq_base_url.starts_with("http://") && !groq_base_url.starts_with("https://") {
        return Err(AssistantError::Config(
            "GROQ_BASE_URL must start with http:// or https://".to_string(),
        ));
    }

    let groq_model =
        std::env::var("GROQ_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string());

    let retriever_base_url = std::env::var("RETRIEVER_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());

    if !retriever_base_url.starts_with("http://")
        && !retriever_base_url.starts_with("https://")
    {
        return Err(AssistantError::Config(
            "RETRIEVER_BASE_URL must start with http:// or https://".to_string(),
        ));
    }

    let server_port = match std::env::var("SERVER_PORT") {
        Ok(v) => v.parse::<u16>().map_err(|_| {
            AssistantError::Config(format!("SERVER_PORT is not a valid port: {v}"))
        })?,
        Err(_) => 5000,
    };

    Ok(Config {
        groq_api_key: api_key,
        groq_base_url,
        groq_model,
        retriever_base_url,
        server_port,
    })
}

/// Load configuration from the environment (`.env` + system env vars).
///
/// Loads `.env` via `dotenvy` first (ignoring errors if the file is absent),
/// then delegates to [`load_config_from_env`].
///
/// # Errors
/// Returns [`AssistantError::Config`] if required variables are missing or invalid.
pub fn load_config() -> Result<Config, AssistantError> {
    // Load .env if present; ignore the error — variables may already be set externally.
    let _ = dotenvy::dotenv();
    load_config_from_env()
}

// ── Controller tunables ────────────────────────────────────────────────────

/// Number of supporting chunks retrieved per question.
pub const RETRIEVAL_TOP_K: usize = 2;

/// Sampling temperature for the generation backend.
pub const TEMPERATURE: f64 = 0.5;

/// Maximum completion tokens requested from the generation backend.
pub const MAX_COMPLETION_TOKENS: u32 = 2048;

/// Maximum allowed length (characters) for a single question.
pub const MAX_QUESTION_LENGTH: usize = 8_192;

/// Bounded timeout for retrieval and generation HTTP calls.
pub const GATEWAY_TIMEOUT_SECS: u64 = 60;

/// Maximum number of conversation turns kept in memory (oldest dropped).
pub const MAX_MEMORY_TURNS: usize = 50;

/// A question shorter than this many words counts as a short follow-up
/// for the confusion-carryover heuristic.
pub const SHORT_FOLLOWUP_WORDS: usize = 8;

/// Minimum prior turns before the confusion-carryover heuristic applies.
pub const MIN_HISTORY_FOR_CARRYOVER: usize = 3;
