//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised when a value fails a domain constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' value '{value}' is not one of: {allowed}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: String,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an error for a value outside a closed enumeration.
    pub fn not_allowed(field: impl Into<String>, value: impl Into<String>, allowed: &[&str]) -> Self {
        ValidationError::NotAllowed {
            field: field.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_displays_bounds() {
        let err = ValidationError::out_of_range("age", 0, 120, 130);
        assert_eq!(err.to_string(), "Field 'age' must be between 0 and 120, got 130");
    }

    #[test]
    fn not_allowed_lists_choices() {
        let err = ValidationError::not_allowed("gender", "x", &["male", "female", "other"]);
        assert_eq!(
            err.to_string(),
            "Field 'gender' value 'x' is not one of: male, female, other"
        );
    }

    #[test]
    fn field_accessor_covers_all_variants() {
        assert_eq!(ValidationError::empty_field("name").field(), "name");
        assert_eq!(ValidationError::invalid_format("id", "bad").field(), "id");
        assert_eq!(ValidationError::out_of_range("age", 0, 1, 2).field(), "age");
        assert_eq!(ValidationError::not_allowed("tier", "x", &[]).field(), "tier");
    }
}
