//! Hosted model configuration (OpenAI or Azure OpenAI)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Hosted model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the chat and embedding endpoints
    pub api_key: Option<String>,

    /// Base URL of the OpenAI API or Azure resource
    pub endpoint: Option<String>,

    /// Azure API version; unset means plain OpenAI
    pub api_version: Option<String>,

    /// Chat model or Azure deployment
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model or Azure deployment
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when the Azure URL scheme is in use
    pub fn is_azure(&self) -> bool {
        self.api_version.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.as_ref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }

        let endpoint = match self.endpoint.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e,
            _ => return Err(ValidationError::MissingRequired("AI__ENDPOINT")),
        };
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(ValidationError::InvalidEndpoint(endpoint.to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            api_version: None,
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AiConfig {
        AiConfig {
            api_key: Some("sk-xxx".to_string()),
            endpoint: Some("https://example.openai.azure.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-ada-002");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.is_azure());
    }

    #[test]
    fn test_validation_missing_key() {
        let config = AiConfig {
            api_key: None,
            ..configured()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AI__API_KEY"))
        );
    }

    #[test]
    fn test_validation_missing_endpoint() {
        let config = AiConfig {
            endpoint: Some("  ".to_string()),
            ..configured()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AI__ENDPOINT"))
        );
    }

    #[test]
    fn test_validation_endpoint_must_be_url() {
        let config = AiConfig {
            endpoint: Some("example.com".to_string()),
            ..configured()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_api_version_selects_azure() {
        let config = AiConfig {
            api_version: Some("2024-02-15-preview".to_string()),
            ..configured()
        };
        assert!(config.is_azure());
    }
}
