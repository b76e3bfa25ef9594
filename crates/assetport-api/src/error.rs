//! Validation error type shared by every record in the data model

use std::fmt;

use thiserror::Error;

/// Number of characters of an offending key or value echoed back in messages
pub const PREVIEW_LEN: usize = 25;

/// Errors raised when a record does not satisfy the import schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A string field is longer than the schema allows
    #[error("{field} exceeds maximum length of {limit} with length of {actual}")]
    TooLong {
        /// Path of the offending field
        field: String,
        /// Maximum number of characters
        limit: usize,
        /// Actual number of characters
        actual: usize,
    },

    /// A collection holds more entries than the schema allows
    #[error("{field} exceeds maximum of {limit} entries with {actual} entries")]
    TooManyEntries {
        /// Path of the offending field
        field: String,
        /// Maximum number of entries
        limit: usize,
        /// Actual number of entries
        actual: usize,
    },

    /// A numeric field is outside its allowed range
    #[error("{field} value {value} is outside the range {min} to {max}")]
    OutOfRange {
        /// Path of the offending field
        field: String,
        /// Value supplied
        value: f64,
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
    },

    /// A string field does not have the expected syntax
    #[error("{field} has invalid value \"{value}\": {reason}")]
    InvalidFormat {
        /// Path of the offending field
        field: String,
        /// Offending value, shortened for display
        value: String,
        /// What was expected
        reason: String,
    },

    /// Input could not be decoded into a record at all
    #[error("malformed input: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Build an [`ValidationError::InvalidFormat`] with the value shortened for display
    pub fn invalid_format(
        field: impl Into<String>,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            value: preview(value),
            reason: reason.into(),
        }
    }

    /// Prefix the field path with the location of the enclosing record
    #[must_use]
    pub fn within(self, parent: impl fmt::Display) -> Self {
        let nest = |field: String| format!("{parent}.{field}");
        match self {
            ValidationError::TooLong {
                field,
                limit,
                actual,
            } => ValidationError::TooLong {
                field: nest(field),
                limit,
                actual,
            },
            ValidationError::TooManyEntries {
                field,
                limit,
                actual,
            } => ValidationError::TooManyEntries {
                field: nest(field),
                limit,
                actual,
            },
            ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            } => ValidationError::OutOfRange {
                field: nest(field),
                value,
                min,
                max,
            },
            ValidationError::InvalidFormat {
                field,
                value,
                reason,
            } => ValidationError::InvalidFormat {
                field: nest(field),
                value,
                reason,
            },
            ValidationError::Malformed(message) => {
                ValidationError::Malformed(format!("{parent}: {message}"))
            }
        }
    }

    /// Path of the offending field, when the error concerns a single field
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::TooLong { field, .. }
            | ValidationError::TooManyEntries { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => Some(field),
            ValidationError::Malformed(_) => None,
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}

/// Shorten a key or value so huge payloads never end up in error text
#[must_use]
pub fn preview(value: &str) -> String {
    if value.chars().count() <= PREVIEW_LEN {
        return value.to_string();
    }
    let head: String = value.chars().take(PREVIEW_LEN).collect();
    format!("{head}...")
}
