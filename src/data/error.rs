//! Data layer error types
//!
//! Errors raised while loading sources and building the dataset.

use thiserror::Error;

/// Errors that can occur while loading or joining source data
#[derive(Error, Debug)]
pub enum DataError {
    /// A source file or feed is missing, unreachable or malformed
    #[error("Data unavailable ({source_name}): {reason}")]
    Unavailable { source_name: String, reason: String },

    /// Case rows could not be matched to reference rows and the
    /// configured policy forbids dropping them
    #[error("Join mismatch: {dropped} case rows without reference data (counties: {})", .counties.join(", "))]
    JoinMismatch {
        dropped: usize,
        counties: Vec<String>,
    },

    /// A pipeline option is out of its valid range
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl DataError {
    /// Build an `Unavailable` error for the named source
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        DataError::Unavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;
