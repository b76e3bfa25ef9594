//! Error types for assetport-transform

use std::path::PathBuf;

use assetport_api::ValidationError;
use thiserror::Error;

/// Errors that can occur while turning external data into import assets
#[derive(Error, Debug)]
pub enum TransformError {
    /// The input file could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed for a reason unrelated to the row contents
    #[error("CSV reader error: {0}")]
    Csv(#[source] csv::Error),

    /// The input as a whole is not valid
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A single record failed validation
    #[error("record {record}: {source}")]
    InvalidRecord {
        /// 1-based position of the record in the input
        record: usize,
        #[source]
        source: ValidationError,
    },

    /// A `target=source` mapping argument could not be parsed
    #[error("invalid field mapping {0:?}: expected target=source")]
    InvalidMapping(String),
}

impl TransformError {
    /// Check if the error concerns the content of the input rather than access to it
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TransformError::Validation(_) | TransformError::InvalidRecord { .. }
        )
    }

    /// The underlying validation error, if any
    #[must_use]
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            TransformError::Validation(err) | TransformError::InvalidRecord { source: err, .. } => {
                Some(err)
            }
            _ => None,
        }
    }
}

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;
