//! Plain-data views of the running metrics.

use serde::{Deserialize, Serialize};

/// Hosted completion call statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmCallStats {
    pub success: u64,
    pub failed: u64,
    pub total_time_ms: u64,
    pub average_time_ms: f64,
}

impl LlmCallStats {
    pub fn total_calls(&self) -> u64 {
        self.success + self.failed
    }
}

/// Retrieval effectiveness statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagQueryStats {
    pub total: u64,
    pub no_matches: u64,
    /// Running mean of the best score per query.
    pub average_similarity: f64,
}

impl RagQueryStats {
    pub fn no_match_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.no_matches as f64 / self.total as f64
        }
    }
}

/// Success/failure counts for one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub success: u64,
    pub failed: u64,
}

/// Turn counts per language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub he: u64,
    pub en: u64,
}

/// Conversation flow statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub collection_phase: PhaseStats,
    pub qa_phase: PhaseStats,
    pub language_stats: LanguageStats,
}

/// Immutable copy of all three aggregates, taken at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub llm_calls: LlmCallStats,
    pub rag_queries: RagQueryStats,
    pub conversation: ConversationStats,
}

impl MetricsSnapshot {
    /// True when every counter and average is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
