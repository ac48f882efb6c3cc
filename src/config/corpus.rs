//! Corpus file configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

/// Corpus configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// Line-delimited JSON file of pre-embedded passages
    #[serde(default = "default_embeddings_file")]
    pub embeddings_file: PathBuf,
}

impl CorpusConfig {
    pub fn embeddings_file(&self) -> &Path {
        &self.embeddings_file
    }

    /// Validate corpus configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.embeddings_file.is_file() {
            return Err(ValidationError::EmbeddingsFileNotFound(
                self.embeddings_file.display().to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            embeddings_file: default_embeddings_file(),
        }
    }
}

fn default_embeddings_file() -> PathBuf {
    PathBuf::from("phase2_data/embedded_docs.jsonl")
}
