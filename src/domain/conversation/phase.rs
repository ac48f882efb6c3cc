//! Conversation phases.
//!
//! A conversation starts by collecting the user's profile and moves to
//! question answering once the profile is complete. There is no way back:
//! `Answering` is absorbing for the life of a conversation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The stage a conversation turn belongs to.
///
/// Supplied by the caller on every turn; the server holds no session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Gathering the structured profile fields.
    #[default]
    #[serde(rename = "collection")]
    Collecting,

    /// Retrieval-augmented question answering.
    #[serde(rename = "qa")]
    Answering,
}

impl Phase {
    /// Wire and metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collection",
            Self::Answering => "qa",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for Phase {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Collecting => vec![Self::Collecting, Self::Answering],
            Self::Answering => vec![Self::Answering],
        }
    }
}
