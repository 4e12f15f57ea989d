//! Error types for the regroup pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - grouping configuration errors
//! - [`CsvError`] - CSV parsing errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Note that a grouping field that never resolves in any record is
//! *not* an error: the engine reports it as a non-fatal hint through
//! the [`crate::group::Diagnostics`] sink and still completes.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in the grouping configuration. These are fatal and abort
/// before any record is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The grouping field is unset or blank after trimming.
    #[error("Field to group by is required and cannot be empty")]
    EmptyGroupField,

    /// Configuration JSON could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode bytes with the detected encoding.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::group::pipeline`]
/// functions. It wraps all lower-level errors and adds pipeline-specific
/// variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input JSON was not an array of records.
    #[error("Expected a JSON array of records, got {0}")]
    NotAnArray(String),

    /// Input file extension is not recognized.
    #[error("Unsupported input format: {0} (expected .csv or .json)")]
    UnsupportedFormat(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ConfigError -> PipelineError
        let config_err = ConfigError::EmptyGroupField;
        let pipeline_err: PipelineError = config_err.into();
        assert!(pipeline_err.to_string().contains("cannot be empty"));

        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));
    }

    #[test]
    fn test_not_an_array_message() {
        let err = PipelineError::NotAnArray("object".into());
        assert!(err.to_string().contains("JSON array"));
        assert!(err.to_string().contains("object"));
    }
}
