//! Conversation languages and script-based detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages the assistant converses in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    He,
    En,
}

impl Language {
    pub const ALLOWED: [&'static str; 2] = ["he", "en"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::He => "he",
            Self::En => "en",
        }
    }

    /// Parses a language code (`he` or `en`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "he" => Some(Self::He),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of letters that must be Hebrew for text to count as Hebrew.
const HEBREW_DOMINANCE: f64 = 0.6;

fn is_hebrew(c: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&c)
}

/// Detects the dominant script of `text`.
///
/// Hebrew when more than 60% of the Hebrew and Latin letters are Hebrew;
/// English otherwise, including text with no letters at all.
pub fn detect_language(text: &str) -> Language {
    let (hebrew, latin) = text.chars().fold((0usize, 0usize), |(h, l), c| {
        if is_hebrew(c) {
            (h + 1, l)
        } else if c.is_ascii_alphabetic() {
            (h, l + 1)
        } else {
            (h, l)
        }
    });

    let total = hebrew + latin;
    if total > 0 && hebrew as f64 / total as f64 > HEBREW_DOMINANCE {
        Language::He
    } else {
        Language::En
    }
}
