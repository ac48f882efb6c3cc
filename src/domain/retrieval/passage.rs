//! Corpus passages and their scored projections.

use serde::{Deserialize, Serialize};

use super::similarity::{checked_norm, cosine_with_norms, DegenerateVectorError, SimilarityError};

/// One retrievable unit of corpus text with its precomputed embedding.
///
/// Immutable once built. The norm is cached so scoring a query against the
/// whole corpus only computes one dot product per passage.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    domain: String,
    text: String,
    embedding: Vec<f32>,
    norm: f32,
}

impl Passage {
    /// Builds a passage, rejecting zero-norm embeddings.
    pub fn new(
        domain: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Result<Self, DegenerateVectorError> {
        let norm = checked_norm(&embedding)?;
        Ok(Self {
            domain: domain.into(),
            text: text.into(),
            embedding,
            norm,
        })
    }

    /// Informational domain label; not unique across the corpus.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    /// Cosine similarity between this passage and a query with known norm.
    pub(crate) fn score_against(&self, query: &[f32], query_norm: f32) -> Result<f32, SimilarityError> {
        cosine_with_norms(query, query_norm, &self.embedding, self.norm)
    }

    pub(crate) fn scored(&self, score: f32) -> ScoredPassage {
        ScoredPassage {
            domain: self.domain.clone(),
            text: self.text.clone(),
            score,
        }
    }
}

/// A passage paired with its similarity to a query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub domain: String,
    pub text: String,
    pub score: f32,
}
