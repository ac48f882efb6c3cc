//! Structured-output schema for the profile completion function.

use serde_json::{json, Value};

use super::record::{Gender, Hmo, Tier, MAX_AGE, MIN_AGE};
use crate::domain::conversation::Language;

/// Name of the function the model calls once every field is collected.
pub const COMPLETE_DATA_COLLECTION: &str = "complete_data_collection";

pub const COMPLETE_DATA_COLLECTION_DESCRIPTION: &str =
    "Call this function when ALL required user information has been successfully collected and validated";

/// JSON Schema of the function arguments, mirroring `ProfileRecord`.
pub fn profile_parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "User's full name"
            },
            "id": {
                "type": "string",
                "pattern": "^[0-9]{9}$",
                "description": "9-digit Israeli ID number"
            },
            "gender": {
                "type": "string",
                "enum": Gender::ALLOWED,
                "description": "User's gender"
            },
            "age": {
                "type": "integer",
                "minimum": MIN_AGE,
                "maximum": MAX_AGE,
                "description": "User's age"
            },
            "hmo": {
                "type": "string",
                "enum": Hmo::ALLOWED,
                "description": "Health maintenance organization name"
            },
            "card": {
                "type": "string",
                "pattern": "^[0-9]{9}$",
                "description": "9-digit HMO card number"
            },
            "tier": {
                "type": "string",
                "enum": Tier::ALLOWED,
                "description": "Insurance membership tier"
            },
            "preferred_language": {
                "type": "string",
                "enum": Language::ALLOWED,
                "description": "User's preferred language for communication"
            }
        },
        "required": ["name", "id", "gender", "age", "hmo", "card", "tier", "preferred_language"]
    })
}
