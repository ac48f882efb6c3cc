//! Conversation domain - phases, turns, language, and fixed prompts.

mod language;
mod phase;
mod templates;
mod turn;

pub use language::{detect_language, Language};
pub use phase::Phase;
pub use templates::{
    collection_complete_message, join_context, qa_system_prompt, COLLECTION_SYSTEM_PROMPT,
    EXTRACTION_FAILED_MESSAGE,
};
pub use turn::{ConversationTurn, HistoryMessage, TurnOutcome, TurnRole};
