//! Mock embedding provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Returns fixed vectors per input text, or a default vector.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    by_text: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    default: Vec<f32>,
    errors: Arc<Mutex<VecDeque<EmbeddingError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingProvider {
    /// Every text embeds to `default` unless overridden.
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            by_text: Arc::new(Mutex::new(HashMap::new())),
            default,
            errors: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Maps one exact input text to a vector.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.by_text.lock().unwrap().insert(text.into(), embedding);
        self
    }

    /// Queues an error for the next call.
    pub fn with_error(self, error: EmbeddingError) -> Self {
        self.errors.lock().unwrap().push_back(error);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.lock().unwrap().push(text.to_string());

        if let Some(err) = self.errors.lock().unwrap().pop_front() {
            return Err(err);
        }

        Ok(self
            .by_text
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }

    fn model(&self) -> &str {
        "mock-embedding-1"
    }
}
