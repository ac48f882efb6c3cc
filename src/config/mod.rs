//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `HMO_ASSISTANT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use hmo_assistant::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Serving corpus {}", config.corpus.embeddings_file.display());
//! ```

mod ai;
mod chat;
mod corpus;
mod error;
mod server;

pub use ai::AiConfig;
pub use chat::ChatConfig;
pub use corpus::CorpusConfig;
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, timeouts, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Hosted model configuration (endpoint, key, models)
    #[serde(default)]
    pub ai: AiConfig,

    /// Per-phase generation and retrieval knobs
    #[serde(default)]
    pub chat: ChatConfig,

    /// Pre-embedded corpus location
    #[serde(default)]
    pub corpus: CorpusConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HMO_ASSISTANT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `HMO_ASSISTANT__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `HMO_ASSISTANT__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HMO_ASSISTANT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Checks the API key and endpoint are present, the corpus file exists,
    /// and every numeric knob is within range.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.chat.validate()?;
        self.corpus.validate()?;
        Ok(())
    }
}
