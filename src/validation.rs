//! Input validation for names, notes and numeric text fields.
//!
//! Everything a user types (player name, habit and location names, location notes,
//! calendar date fields) passes through here before it touches the player aggregate.
//! A validation failure is reported to the caller and nothing is mutated or saved.

use std::str::FromStr;

/// Maximum length (in characters) of player, habit and location names.
pub const MAX_NAME_LENGTH: usize = 60;

/// Maximum length (in characters) of free-form location notes.
pub const MAX_NOTES_LENGTH: usize = 500;

/// Validation errors with messages suitable for inline display
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} is too long (maximum {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains control characters")]
    ControlCharacters { field: &'static str },

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{year:04}-{month:02}-{day:02} is not a valid date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Birth date cannot be in the future")]
    BirthDateInFuture,

    #[error("life expectancy must be between {min} and {max} years (got {value})")]
    LifeExpectancyOutOfRange { value: u32, min: u32, max: u32 },

    #[error("unknown {field} '{value}'")]
    UnknownVariant { field: &'static str, value: String },

    #[error("point ({x:.1}, {y:.1}) is outside the map")]
    OutsideMap { x: f64, y: f64 },
}

/// Validate a single-line display name and return it trimmed.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters { field });
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

/// Validate optional multi-line notes. Empty input is allowed; newlines and tabs are
/// kept, other control characters are rejected.
pub fn validate_notes(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t')
    {
        return Err(ValidationError::ControlCharacters { field: "notes" });
    }
    if trimmed.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes",
            max: MAX_NOTES_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

/// Parse a numeric text field, reporting the field name on failure.
pub fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: value.to_string(),
        })
}
