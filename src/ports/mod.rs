//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - hosted chat completion with optional structured output
//! - `EmbeddingProvider` - hosted text embedding

mod ai_provider;
mod embedding_provider;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, FunctionSchema,
    Message, MessageRole, ProviderInfo, RequestMetadata, StructuredCall, TokenUsage,
};
pub use embedding_provider::{EmbeddingError, EmbeddingProvider};
