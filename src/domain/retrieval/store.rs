//! In-memory corpus of pre-embedded passages.
//!
//! The corpus is a line-delimited JSON file, one
//! `{"domain": ..., "text": ..., "embedding": [...]}` record per line. It is
//! loaded once before serving and is read-only afterwards. A reload builds a
//! complete new [`EmbeddingStore`] and swaps the shared pointer, so a reader
//! holds either the old or the new corpus, never a mix.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use thiserror::Error;

use super::ranking::{rank_passages, Ranking};
use super::similarity::SimilarityError;
use super::Passage;

/// Errors that make a corpus unusable. Fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open corpus {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("embedding on line {line} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("embedding on line {line} has zero norm")]
    DegenerateEmbedding { line: usize },

    #[error("corpus contains no passages")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct PassageRecord {
    domain: String,
    text: String,
    embedding: Vec<f32>,
}

/// Ordered, non-empty collection of passages sharing one dimensionality.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    passages: Vec<Passage>,
    dimensions: usize,
}

impl EmbeddingStore {
    /// Loads a corpus file.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the file is missing or unreadable, if any record
    /// is malformed, or if the corpus is empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses line-delimited records. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        let mut passages = Vec::new();
        let mut expected_dims: Option<usize> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: PassageRecord =
                serde_json::from_str(&line).map_err(|e| LoadError::Malformed {
                    line: line_no,
                    reason: e.to_string(),
                })?;

            if record.embedding.is_empty() {
                return Err(LoadError::Malformed {
                    line: line_no,
                    reason: "embedding is empty".to_string(),
                });
            }

            let actual = record.embedding.len();
            match expected_dims {
                Some(expected) if expected != actual => {
                    return Err(LoadError::DimensionMismatch {
                        line: line_no,
                        expected,
                        actual,
                    });
                }
                Some(_) => {}
                None => expected_dims = Some(actual),
            }

            let passage = Passage::new(record.domain, record.text, record.embedding)
                .map_err(|_| LoadError::DegenerateEmbedding { line: line_no })?;
            passages.push(passage);
        }

        Self::from_passages(passages)
    }

    /// Builds a store from already-constructed passages.
    pub fn from_passages(passages: Vec<Passage>) -> Result<Self, LoadError> {
        let dimensions = passages.first().map(Passage::dimensions).ok_or(LoadError::Empty)?;

        if let Some((idx, p)) = passages
            .iter()
            .enumerate()
            .find(|(_, p)| p.dimensions() != dimensions)
        {
            return Err(LoadError::DimensionMismatch {
                line: idx + 1,
                expected: dimensions,
                actual: p.dimensions(),
            });
        }

        Ok(Self {
            passages,
            dimensions,
        })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Always false for a successfully built store.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Shared embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Scores the whole corpus against `query`. See [`rank_passages`].
    pub fn rank(&self, query: &[f32], threshold: f32, k: usize) -> Result<Ranking, SimilarityError> {
        rank_passages(&self.passages, query, threshold, k)
    }
}

/// Process-wide handle to the current corpus snapshot.
#[derive(Debug)]
pub struct SharedEmbeddingStore {
    current: RwLock<Arc<EmbeddingStore>>,
}

impl SharedEmbeddingStore {
    pub fn new(store: EmbeddingStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// Returns the active snapshot. Callers keep it for the whole query.
    pub fn current(&self) -> Arc<EmbeddingStore> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in a new snapshot and returns the previous one.
    pub fn replace(&self, store: EmbeddingStore) -> Arc<EmbeddingStore> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(store))
    }

    /// Loads `path` and swaps it in. On failure the old snapshot stays active.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let store = EmbeddingStore::load(path)?;
        let count = store.len();
        self.replace(store);
        tracing::info!(count, "Corpus reloaded");
        Ok(count)
    }
}
