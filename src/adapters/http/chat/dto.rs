//! Data Transfer Objects for the chat HTTP API
//!
//! These types define the JSON request/response format for the endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{ConversationTurn, HistoryMessage, Phase, TurnOutcome};
use crate::domain::metrics::MetricsSnapshot;
use crate::domain::profile::ProfileRecord;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to answer one conversation turn
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub hmo: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub user_info: serde_json::Map<String, serde_json::Value>,
}

impl From<AskRequest> for ConversationTurn {
    fn from(req: AskRequest) -> Self {
        ConversationTurn {
            history: req.history,
            question: req.question,
            phase: req.phase,
            hmo: req.hmo,
            tier: req.tier,
            user_info: req.user_info,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for one conversation turn
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub phase_transition: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<ProfileRecord>,
}

impl From<TurnOutcome> for AskResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            answer: outcome.answer,
            phase_transition: outcome.phase_transition,
            user_info: outcome.user_info,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub metrics: MetricsSnapshot,
    /// RFC 3339, UTC
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Corpus reload result
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    /// Passages in the newly active corpus.
    pub passages: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            code: "UPSTREAM_ERROR".to_string(),
            message: message.into(),
        }
    }

    pub fn upstream_timeout(message: impl Into<String>) -> Self {
        Self {
            code: "UPSTREAM_TIMEOUT".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ask_request_defaults_to_collection() {
        let req: AskRequest = serde_json::from_value(json!({"question": "שלום"})).unwrap();
        let turn = ConversationTurn::from(req);

        assert_eq!(turn.phase, Phase::Collecting);
        assert!(turn.history.is_empty());
        assert!(turn.user_info.is_empty());
    }

    #[test]
    fn ask_request_reads_qa_phase_and_history() {
        let req: AskRequest = serde_json::from_value(json!({
            "question": "Is dental covered?",
            "phase": "qa",
            "hmo": "מכבי",
            "tier": "זהב",
            "language": "en",
            "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]
        }))
        .unwrap();
        let turn = ConversationTurn::from(req);

        assert_eq!(turn.phase, Phase::Answering);
        assert_eq!(turn.history.len(), 2);
        assert_eq!(turn.hmo.as_deref(), Some("מכבי"));
    }

    #[test]
    fn ask_response_omits_missing_profile() {
        let json = serde_json::to_value(AskResponse::from(TurnOutcome::answer("hi"))).unwrap();

        assert_eq!(json, json!({"answer": "hi", "phase_transition": false}));
    }

    #[test]
    fn error_response_serializes() {
        let json = serde_json::to_string(&ErrorResponse::bad_request("question is empty")).unwrap();

        assert!(json.contains("BAD_REQUEST"));
        assert!(json.contains("question is empty"));
    }
}
