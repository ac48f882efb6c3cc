//! The completed user profile and its field constraints.
//!
//! A `ProfileRecord` only exists once every field has passed validation.
//! Model payloads go through [`ProfileRecord::from_arguments`]; nothing else
//! constructs one from untrusted data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::conversation::Language;
use crate::domain::foundation::ValidationError;

/// Why a structured extraction payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionParseError {
    #[error("payload is not valid profile JSON: {0}")]
    Json(String),

    #[error("payload failed validation: {0}")]
    Invalid(#[from] ValidationError),

    #[error("unexpected function call: {0}")]
    UnexpectedFunction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALLOWED: [&'static str; 3] = ["male", "female", "other"];

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(ValidationError::not_allowed("gender", value, &Self::ALLOWED)),
        }
    }
}

/// Health maintenance organizations, by their Hebrew names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hmo {
    #[serde(rename = "מכבי")]
    Maccabi,
    #[serde(rename = "מאוחדת")]
    Meuhedet,
    #[serde(rename = "כללית")]
    Clalit,
}

impl Hmo {
    pub const ALLOWED: [&'static str; 3] = ["מכבי", "מאוחדת", "כללית"];

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "מכבי" => Ok(Self::Maccabi),
            "מאוחדת" => Ok(Self::Meuhedet),
            "כללית" => Ok(Self::Clalit),
            _ => Err(ValidationError::not_allowed("hmo", value, &Self::ALLOWED)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maccabi => "מכבי",
            Self::Meuhedet => "מאוחדת",
            Self::Clalit => "כללית",
        }
    }
}

/// Insurance membership tiers (gold, silver, bronze).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "זהב")]
    Gold,
    #[serde(rename = "כסף")]
    Silver,
    #[serde(rename = "ארד")]
    Bronze,
}

impl Tier {
    pub const ALLOWED: [&'static str; 3] = ["זהב", "כסף", "ארד"];

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "זהב" => Ok(Self::Gold),
            "כסף" => Ok(Self::Silver),
            "ארד" => Ok(Self::Bronze),
            _ => Err(ValidationError::not_allowed("tier", value, &Self::ALLOWED)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "זהב",
            Self::Silver => "כסף",
            Self::Bronze => "ארד",
        }
    }
}

pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;
const NUMBER_LENGTH: usize = 9;

/// A complete, validated user profile. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRecord {
    name: String,
    id: String,
    gender: Gender,
    age: u8,
    hmo: Hmo,
    card: String,
    tier: Tier,
    preferred_language: Language,
}

/// Untrusted shape of the model's function arguments.
#[derive(Debug, Deserialize)]
struct RawProfile {
    name: String,
    id: String,
    gender: String,
    age: i64,
    hmo: String,
    card: String,
    tier: String,
    preferred_language: String,
}

fn nine_digits(field: &str, value: &str) -> Result<String, ValidationError> {
    if value.len() != NUMBER_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            field,
            format!("expected exactly {NUMBER_LENGTH} digits"),
        ));
    }
    Ok(value.to_string())
}

fn parse_language(value: &str) -> Result<Language, ValidationError> {
    Language::from_code(value).ok_or_else(|| {
        ValidationError::not_allowed("preferred_language", value, &Language::ALLOWED)
    })
}

impl ProfileRecord {
    /// Parses and validates a JSON object of function-call arguments.
    ///
    /// # Errors
    ///
    /// `ExtractionParseError::Json` if the payload is not an object with the
    /// eight fields of the right JSON types, `ExtractionParseError::Invalid`
    /// if any field breaks its constraint.
    pub fn from_arguments(arguments: &str) -> Result<Self, ExtractionParseError> {
        let raw: RawProfile = serde_json::from_str(arguments)
            .map_err(|e| ExtractionParseError::Json(e.to_string()))?;
        Ok(Self::validate(raw)?)
    }

    fn validate(raw: RawProfile) -> Result<Self, ValidationError> {
        let name = raw.name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        if !(MIN_AGE..=MAX_AGE).contains(&raw.age) {
            return Err(ValidationError::out_of_range("age", MIN_AGE, MAX_AGE, raw.age));
        }

        Ok(Self {
            name: name.to_string(),
            id: nine_digits("id", &raw.id)?,
            gender: Gender::parse(raw.gender.trim())?,
            // In range 0..=120 checked above.
            age: raw.age as u8,
            hmo: Hmo::parse(raw.hmo.trim())?,
            card: nine_digits("card", &raw.card)?,
            tier: Tier::parse(raw.tier.trim())?,
            preferred_language: parse_language(raw.preferred_language.trim())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn hmo(&self) -> Hmo {
        self.hmo
    }

    pub fn card(&self) -> &str {
        &self.card
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn preferred_language(&self) -> Language {
        self.preferred_language
    }
}
