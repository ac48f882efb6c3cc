//! AI Provider Adapters.
//!
//! Implementations of the AIProvider and EmbeddingProvider ports.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI / Azure OpenAI chat completions with function tools
//! - `OpenAIEmbedder` - OpenAI / Azure OpenAI embeddings
//! - `MockAIProvider` - Configurable chat mock for testing
//! - `MockEmbeddingProvider` - Configurable embedding mock for testing

mod mock_embedder;
mod mock_provider;
mod openai_embedder;
mod openai_provider;

pub use mock_embedder::MockEmbeddingProvider;
pub use mock_provider::{MockAIProvider, MockResponse};
pub use openai_embedder::OpenAIEmbedder;
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
