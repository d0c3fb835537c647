//! Error taxonomy for the explorer library.
//!
//! Only two conditions abort a query: a selection token outside its closed set,
//! and a source file that cannot be read or parsed. Missing optional columns and
//! empty filter results are reported inside the [`StatisticsReport`] instead.
//!
//! [`StatisticsReport`]: crate::analyzers::types::StatisticsReport

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("unrecognised {kind} '{value}'; expected one of: {expected}")]
    InvalidSelection {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("{}: {reason}", path.display())]
    DataFormat { path: PathBuf, reason: String },
}

impl ExplorerError {
    pub fn invalid_selection(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        ExplorerError::InvalidSelection {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }

    pub fn data_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ExplorerError::DataFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_selection(&self) -> bool {
        matches!(self, ExplorerError::InvalidSelection { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
