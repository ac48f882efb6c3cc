//! Application layer - services that wire ports to domain logic.
//!
//! - `Retriever` - embed a query and rank the corpus
//! - `CollectionExtractor` - one structured-output completion per collection turn
//! - `PhaseOrchestrator` - per-turn routing between collection and QA

mod collection_extractor;
mod completion;
mod orchestrator;
mod retriever;

pub use collection_extractor::{CollectionExtractor, CollectionOutcome};
pub use completion::PhaseSettings;
pub use orchestrator::{OrchestratorSettings, PhaseOrchestrator, TurnError};
pub use retriever::{RetrievalError, RetrievalSettings, Retriever};
