//! Retriever - turns a free-text query into ranked corpus context.

use std::sync::Arc;

use crate::domain::metrics::MetricsAggregator;
use crate::domain::retrieval::{
    DegenerateVectorError, DimensionMismatchError, RetrievalResult, SharedEmbeddingStore,
    SimilarityError,
};
use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Retrieval knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalSettings {
    /// Maximum passages returned on a match.
    pub top_k: usize,
    /// Minimum cosine score for a passage to count as relevant.
    pub relevance_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 2,
            relevance_threshold: 0.7,
        }
    }
}

/// Errors from a retrieval call.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    DegenerateVector(#[from] DegenerateVectorError),

    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatchError),

    #[error("top-k must be positive")]
    InvalidTopK,
}

impl From<SimilarityError> for RetrievalError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::Degenerate(e) => RetrievalError::DegenerateVector(e),
            SimilarityError::DimensionMismatch(e) => RetrievalError::DimensionMismatch(e),
        }
    }
}

impl RetrievalError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetrievalError::Embedding(e) if e.is_timeout())
    }
}

/// Embeds a query and ranks the current corpus snapshot against it.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<SharedEmbeddingStore>,
    metrics: Arc<MetricsAggregator>,
    relevance_threshold: f32,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<SharedEmbeddingStore>,
        metrics: Arc<MetricsAggregator>,
        relevance_threshold: f32,
    ) -> Self {
        Self {
            embedder,
            store,
            metrics,
            relevance_threshold,
        }
    }

    /// Returns at most `k` relevant passages, best first, or `NoMatch`.
    ///
    /// Exactly one embedding call is made. A RAG observation is recorded
    /// whenever scores were computed; errors before that point record nothing.
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        k: usize,
    ) -> Result<RetrievalResult, RetrievalError> {
        let (result, observation) = self.retrieve_unrecorded(query, k).await?;
        observation.record(&self.metrics);
        Ok(result)
    }

    /// Like [`Retriever::retrieve_top_k`], but hands the RAG observation back
    /// to the caller instead of recording it.
    pub(crate) async fn retrieve_unrecorded(
        &self,
        query: &str,
        k: usize,
    ) -> Result<(RetrievalResult, RagObservation), RetrievalError> {
        if k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }

        let embedding = self.embedder.embed(query).await?;

        // Hold one snapshot for the whole query so a concurrent reload is invisible.
        let store = self.store.current();
        let ranking = store.rank(&embedding, self.relevance_threshold, k)?;

        let observation = RagObservation {
            max_score: ranking.max_score,
            matched: ranking.found_match(),
        };

        if observation.matched {
            tracing::info!(
                docs_found = ranking.matches.len(),
                top_score = ranking.matches[0].score,
                query_length = query.chars().count(),
                domains = ?ranking.matched_domains(),
                "Retrieved relevant documents"
            );
        } else {
            tracing::info!(
                max_score = ranking.max_score,
                threshold = self.relevance_threshold,
                query_length = query.chars().count(),
                "No relevant documents found"
            );
        }

        Ok((ranking.into_result(), observation))
    }
}

/// One retrieval's contribution to the RAG metrics, not yet recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RagObservation {
    pub max_score: f32,
    pub matched: bool,
}

impl RagObservation {
    pub(crate) fn record(self, metrics: &MetricsAggregator) {
        metrics.record_rag_query(self.max_score, self.matched);
    }
}
