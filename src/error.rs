//! Error types for the analyzer

use thiserror::Error;

/// Failures surfaced to the caller.
///
/// Row-level defects (unparseable timestamps) are never errors; they are
/// filtered by the engine. Everything here stops the run before any
/// aggregate is computed.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Could not detect trade table header")]
    HeaderNotFound,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// True for schema problems in the input table, as opposed to I/O or
    /// configuration failures.
    pub fn is_structural(&self) -> bool {
        matches!(self, AnalyzerError::HeaderNotFound | AnalyzerError::MissingColumns(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
