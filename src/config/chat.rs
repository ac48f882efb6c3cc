//! Per-phase generation and retrieval knobs

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::{OrchestratorSettings, PhaseSettings, RetrievalSettings};

/// Chat configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_temperature")]
    pub collection_temperature: f32,

    #[serde(default = "default_temperature")]
    pub qa_temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Passages handed to the QA prompt
    #[serde(default = "default_top_k")]
    pub top_k_documents: usize,

    /// Minimum cosine score for a passage to be relevant
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

impl ChatConfig {
    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        in_range("collection_temperature", self.collection_temperature, 0.0, 2.0)?;
        in_range("qa_temperature", self.qa_temperature, 0.0, 2.0)?;
        in_range("similarity_threshold", self.similarity_threshold, -1.0, 1.0)?;
        if self.max_tokens == 0 {
            return Err(ValidationError::NotPositive("max_tokens"));
        }
        if self.top_k_documents == 0 {
            return Err(ValidationError::NotPositive("top_k_documents"));
        }
        Ok(())
    }

    /// Builds the knobs injected into the orchestrator
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            collection: PhaseSettings {
                temperature: self.collection_temperature,
                max_tokens: self.max_tokens,
            },
            qa: PhaseSettings {
                temperature: self.qa_temperature,
                max_tokens: self.max_tokens,
            },
            retrieval: RetrievalSettings {
                top_k: self.top_k_documents,
                relevance_threshold: self.similarity_threshold,
            },
        }
    }
}

fn in_range(field: &'static str, actual: f32, min: f32, max: f32) -> Result<(), ValidationError> {
    // NaN fails this check too.
    if (min..=max).contains(&actual) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            actual,
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            collection_temperature: default_temperature(),
            qa_temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_k_documents: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_top_k() -> usize {
    2
}

fn default_similarity_threshold() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 1500);
        assert_eq!(config.top_k_documents, 2);
    }

    #[test]
    fn test_temperature_out_of_range() {
        let config = ChatConfig {
            qa_temperature: 2.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange {
                field: "qa_temperature",
                ..
            })
        ));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = ChatConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let config = ChatConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::NotPositive("max_tokens"))
        );
    }

    #[test]
    fn test_settings_conversion() {
        let config = ChatConfig {
            collection_temperature: 0.3,
            qa_temperature: 0.9,
            top_k_documents: 4,
            similarity_threshold: 0.8,
            ..Default::default()
        };

        let settings = config.orchestrator_settings();

        assert_eq!(settings.collection.temperature, 0.3);
        assert_eq!(settings.qa.temperature, 0.9);
        assert_eq!(settings.qa.max_tokens, 1500);
        assert_eq!(settings.retrieval.top_k, 4);
        assert_eq!(settings.retrieval.relevance_threshold, 0.8);
    }
}
