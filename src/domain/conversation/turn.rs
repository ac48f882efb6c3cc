//! Inbound conversation turns and their outcomes.

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::domain::profile::ProfileRecord;

/// Who authored a history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: TurnRole,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything the engine needs for one turn. Not retained after the turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    pub question: String,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub hmo: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub user_info: serde_json::Map<String, serde_json::Value>,
}

impl ConversationTurn {
    pub fn new(phase: Phase, question: impl Into<String>) -> Self {
        Self {
            phase,
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_membership(mut self, hmo: impl Into<String>, tier: impl Into<String>) -> Self {
        self.hmo = Some(hmo.into());
        self.tier = Some(tier.into());
        self
    }
}

/// What the caller gets back for a turn.
///
/// When `phase_transition` is true, `user_info` holds the completed profile
/// and the caller must send `Phase::Answering` on subsequent turns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    pub phase_transition: bool,
    pub user_info: Option<ProfileRecord>,
}

impl TurnOutcome {
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            phase_transition: false,
            user_info: None,
        }
    }

    pub fn transition(answer: impl Into<String>, profile: ProfileRecord) -> Self {
        Self {
            answer: answer.into(),
            phase_transition: true,
            user_info: Some(profile),
        }
    }
}
