//! Retrieval gateway — thin interface to the external similarity-search index.
//!
//! The index itself (embedding model included) is a swappable black box
//! reached over HTTP. Results come back in similarity-rank order; ties are
//! whatever the index decided and are passed through unchanged. Nothing is
//! cached across queries.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{Config, GATEWAY_TIMEOUT_SECS};
use crate::error::AssistantError;
use crate::types::RetrievedChunk;

/// Similarity search over the external document index.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return the `k` passages most similar to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, AssistantError>;
}

#[async_trait]
impl Retriever for Box<dyn Retriever> {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, AssistantError> {
        (**self).search(query, k).await
    }
}

// ── HTTP implementation ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    chunks: Vec<ChunkBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkBody {
    text: String,
}

/// HTTP client for the vector-search sidecar.
///
/// Wire contract: `POST {base}/api/v1/search` with `{"query", "k"}` returns
/// `{"chunks": [{"text": ...}, ...]}`; `GET {base}/api/v1/heartbeat` answers
/// 2xx when the index is ready.
pub struct HttpRetriever {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetriever {
    /// Build a client for the configured retrieval service.
    pub fn new(config: &Config) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GATEWAY_TIMEOUT_SECS))
            .build()
            .map_err(AssistantError::Http)?;
        Ok(Self {
            client,
            base_url: config.retriever_base_url.clone(),
        })
    }

    /// Startup check: fail fast when the index is unreachable.
    ///
    /// # Errors
    /// Returns [`AssistantError::Retrieval`] when the service does not answer
    /// the heartbeat with a success status. Fatal at startup — the process
    /// must not serve requests without its index.
    pub async fn heartbeat(&self) -> Result<(), AssistantError> {
        let url = format!("{}/api/v1/heartbeat", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AssistantError::Retrieval(format!("vector index unreachable: {e}"))
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AssistantError::Retrieval(format!(
                "vector index heartbeat returned HTTP {}",
                response.status().as_u16()
            )))
        }
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, AssistantError> {
        let url = format!("{}/api/v1/search", self.base_url);
        let body = serde_json::json!({ "query": query, "k": k });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Retrieval(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Retrieval(format!(
                "search returned HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Retrieval(format!("malformed search response: {e}")))?;

        Ok(parsed
            .chunks
            .into_iter()
            .map(|c| RetrievedChunk { text: c.text })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_deserializes() {
        let raw = r#"{"chunks": [{"text": "beam theory"}, {"text": "shear force"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.chunks.len(), 2);
        assert_eq!(parsed.chunks[0].text, "beam theory");
    }

    #[test]
    fn empty_chunk_list_is_valid() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"chunks": []}"#).unwrap();
        assert!(parsed.chunks.is_empty());
    }
}
