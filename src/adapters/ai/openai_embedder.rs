//! OpenAI embedding client - Implementation of EmbeddingProvider.
//!
//! Shares `OpenAIConfig` with the chat provider; the configured model is the
//! embedding model (or its Azure deployment name).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::openai_provider::{parse_retry_after, OpenAIConfig};
use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Embedding client for `{endpoint}/embeddings`.
pub struct OpenAIEmbedder {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIEmbedder {
    pub fn new(config: OpenAIConfig) -> Result<Self, EmbeddingError> {
        let client = config
            .http_client()
            .map_err(|e| EmbeddingError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn to_request<'a>(&'a self, text: &'a str) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            model: &self.config.model,
            input: text,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .config
            .authorize(self.client.post(self.config.operation_url("embeddings")))
            .json(&self.to_request(text))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        timeout_secs: self.config.timeout_secs(),
                    }
                } else {
                    EmbeddingError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(format!("Failed to parse response: {}", e)))?;

        first_embedding(parsed)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn classify_status(status: u16, body: &str) -> EmbeddingError {
    match status {
        401 | 403 => EmbeddingError::AuthenticationFailed,
        429 => EmbeddingError::RateLimited {
            retry_after_secs: parse_retry_after(body),
        },
        500..=599 => EmbeddingError::Unavailable(format!("Server error {}: {}", status, body)),
        _ => EmbeddingError::Network(format!("Unexpected status {}: {}", status, body)),
    }
}

fn first_embedding(response: EmbeddingResponse) -> Result<Vec<f32>, EmbeddingError> {
    response
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or_else(|| EmbeddingError::Parse("No embedding in response".to_string()))
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
