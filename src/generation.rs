//! Generation gateway — HTTP client for the Groq (OpenAI-compatible) chat API.
//!
//! The backend only generates text; all adaptation logic lives in the
//! controller. Conversation memory is replayed as prior chat messages and the
//! fully rendered prompt (persona + instructions + context + question) goes
//! in as the final user message.
//!
//! Timeouts and connection failures are reported as the stale-session error
//! category so the dialogue session can rebuild its binding and retry once.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::config::{Config, GATEWAY_TIMEOUT_SECS, MAX_COMPLETION_TOKENS, TEMPERATURE};
use crate::error::AssistantError;
use crate::types::{Role, Turn};

/// Raw response received from the generation backend.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Text generation over a rendered prompt and conversation memory.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce an answer for `rendered_prompt` given the prior `memory`.
    async fn generate(
        &self,
        rendered_prompt: &str,
        memory: &[Turn],
    ) -> Result<GenerationResponse, AssistantError>;
}

#[async_trait]
impl Generator for Box<dyn Generator> {
    async fn generate(
        &self,
        rendered_prompt: &str,
        memory: &[Turn],
    ) -> Result<GenerationResponse, AssistantError> {
        (**self).generate(rendered_prompt, memory).await
    }
}

// ── Groq client ───────────────────────────────────────────────────────────────

/// HTTP client for the Groq chat-completions endpoint.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    /// Build a client from the runtime configuration.
    pub fn new(config: &Config) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GATEWAY_TIMEOUT_SECS))
            .build()
            .map_err(AssistantError::Http)?;
        Ok(Self {
            client,
            api_key: config.groq_api_key.clone(),
            base_url: config.groq_base_url.clone(),
            model: config.groq_model.clone(),
        })
    }

    /// Build the JSON request body.
    fn build_body(&self, rendered_prompt: &str, memory: &[Turn]) -> serde_json::Value {
        let mut messages: Vec<serde_json::Value> = memory
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                json!({ "role": role, "content": turn.text })
            })
            .collect();

        messages.push(json!({ "role": "user", "content": rendered_prompt }));

        json!({
            "model":       self.model,
            "messages":    messages,
            "temperature": TEMPERATURE,
            "max_tokens":  MAX_COMPLETION_TOKENS,
        })
    }

    /// Execute the POST request and surface structured HTTP errors.
    async fn post(&self, body: serde_json::Value) -> Result<serde_json::Value, AssistantError> {
        let url = format!("{}/openai/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // Expired / unresponsive connections get the retryable-once path.
                if e.is_timeout() || e.is_connect() {
                    AssistantError::StaleSession(format!("generation backend: {e}"))
                } else {
                    AssistantError::Http(e)
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<serde_json::Value>()
                .await
                .map_err(AssistantError::Http);
        }

        // Read body for diagnostics before consuming the response.
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "(unreadable body)".to_string());

        Err(map_http_error(status.as_u16(), &error_body))
    }

    /// Parse the raw chat-completions JSON into a [`GenerationResponse`].
    fn parse_response(json: serde_json::Value) -> Result<GenerationResponse, AssistantError> {
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AssistantError::Generation("response missing choices[0].message.content".to_string())
            })?
            .to_string();

        let model = json
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let prompt_tokens = json
            .pointer("/usage/prompt_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        let completion_tokens = json
            .pointer("/usage/completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        Ok(GenerationResponse {
            text,
            model,
            prompt_tokens,
            completion_tokens,
        })
    }
}

#[async_trait]
impl Generator for GroqClient {
    async fn generate(
        &self,
        rendered_prompt: &str,
        memory: &[Turn],
    ) -> Result<GenerationResponse, AssistantError> {
        let body = self.build_body(rendered_prompt, memory);
        let raw = self.post(body).await?;
        Self::parse_response(raw)
    }
}

// ── HTTP error mapping ────────────────────────────────────────────────────────

/// Maximum number of characters from an HTTP error body included in error
/// messages, so large or sensitive server responses do not propagate
/// verbatim through error chains and log sinks.
const MAX_ERROR_BODY_LEN: usize = 200;

fn map_http_error(status: u16, body: &str) -> AssistantError {
    // Char-based truncation avoids panicking at a multi-byte UTF-8 boundary.
    let safe_body = if body.chars().count() > MAX_ERROR_BODY_LEN {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{truncated}…[truncated]")
    } else {
        body.to_string()
    };

    match status {
        401 => AssistantError::Generation("Unauthorized: check GROQ_API_KEY".to_string()),
        429 => AssistantError::Generation("Rate limited by the Groq API".to_string()),
        s if s >= 500 => {
            AssistantError::Generation(format!("Groq server error {s}: {safe_body}"))
        }
        s => AssistantError::Generation(format!("HTTP {s}: {safe_body}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
