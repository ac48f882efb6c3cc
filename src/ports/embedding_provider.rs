//! Embedding Provider Port - Interface for hosted text embedding.

use async_trait::async_trait;

/// Port for turning text into an embedding vector.
///
/// One call per query; implementations do not retry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `text` with the configured model.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embedding model identifier.
    fn model(&self) -> &str;
}

/// Embedding call failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbeddingError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("embedding service unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("embedding request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl EmbeddingError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, EmbeddingError::Timeout { .. })
    }
}
