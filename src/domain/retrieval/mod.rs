//! Retrieval domain - corpus, similarity scoring, and relevance ranking.
//!
//! Pure logic only; obtaining the query embedding is the job of the
//! `Retriever` application service.

mod passage;
mod ranking;
mod result;
mod similarity;
mod store;

pub use passage::{Passage, ScoredPassage};
pub use ranking::{rank_passages, Ranking};
pub use result::{RetrievalResult, NO_MATCH_MESSAGE};
pub use similarity::{
    cosine_similarity, norm, DegenerateVectorError, DimensionMismatchError, SimilarityError,
};
pub use store::{EmbeddingStore, LoadError, SharedEmbeddingStore};
