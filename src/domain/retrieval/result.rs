//! Outcome of a retrieval query.

use serde::Serialize;

use super::ScoredPassage;

/// Fixed answer returned when no passage clears the relevance threshold.
pub const NO_MATCH_MESSAGE: &str =
    "לא נמצא מידע רלוונטי לשאלה זו. אנא נסח את השאלה מחדש או שאל על נושא אחר.";

/// Exactly one of these is produced per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrievalResult {
    /// Relevant passages, best first, at most `k` of them.
    Matched { passages: Vec<ScoredPassage> },
    /// Nothing relevant; carries the fixed fallback message.
    NoMatch { message: String },
}

impl RetrievalResult {
    pub fn no_match() -> Self {
        Self::NoMatch {
            message: NO_MATCH_MESSAGE.to_string(),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Matched passages, or an empty slice on the no-match path.
    pub fn passages(&self) -> &[ScoredPassage] {
        match self {
            Self::Matched { passages } => passages,
            Self::NoMatch { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_carries_fixed_message() {
        let result = RetrievalResult::no_match();
        assert!(!result.is_match());
        assert!(result.passages().is_empty());
        assert_eq!(
            result,
            RetrievalResult::NoMatch {
                message: NO_MATCH_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(RetrievalResult::no_match()).unwrap();
        assert_eq!(json["kind"], "no_match");
    }
}
