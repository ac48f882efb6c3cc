//! Metrics domain - running statistics over calls, retrieval, and turns.

mod aggregator;
mod snapshot;

pub use aggregator::MetricsAggregator;
pub use snapshot::{
    ConversationStats, LanguageStats, LlmCallStats, MetricsSnapshot, PhaseStats, RagQueryStats,
};
