//! Error types for the geolearn library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`GeolearnError`] enum. The variants follow the pipeline's failure
//! taxonomy: configuration and schema problems are fatal to the run,
//! source and storage problems are fatal at the component boundary, while
//! record and prediction problems are recoverable per-record conditions
//! that callers log and skip.

use std::io;

use thiserror::Error;

/// The main error type for geolearn operations.
#[derive(Error, Debug)]
pub enum GeolearnError {
    /// I/O errors (file operations, output writing, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration: unknown classifier name, bad evaluation rate.
    /// Raised before any I/O or fitting happens.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dataset schema violation, e.g. training/classification mismatch
    /// after a split. Always fatal to the run.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A single record failed resolution or feature coercion. Recoverable:
    /// callers log and continue with the remaining records.
    #[error("Record error: {0}")]
    Record(String),

    /// A classifier could not produce a label for one record, typically
    /// because of feature values unseen during fitting. Recoverable.
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Boundary dataset or ingestion source unreachable or unparsable.
    /// Fatal at construction; no partially initialized component escapes.
    #[error("Source error: {0}")]
    Source(String),

    /// Record store errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Classifier construction or fitting errors.
    #[error("Learner error: {0}")]
    Learner(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite errors from the record store
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with GeolearnError.
pub type Result<T> = std::result::Result<T, GeolearnError>;

impl GeolearnError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Config(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Schema(msg.into())
    }

    /// Create a new per-record error.
    pub fn record<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Record(msg.into())
    }

    /// Create a new prediction error.
    pub fn prediction<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Prediction(msg.into())
    }

    /// Create a new source error.
    pub fn source<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Source(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Storage(msg.into())
    }

    /// Create a new learner error.
    pub fn learner<S: Into<String>>(msg: S) -> Self {
        GeolearnError::Learner(msg.into())
    }

    /// Whether this error is a recoverable per-record condition, as
    /// opposed to a structural problem that must abort the run.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            GeolearnError::Record(_) | GeolearnError::Prediction(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = GeolearnError::config("unknown classifier name 'foo'");
        assert_eq!(
            error.to_string(),
            "Configuration error: unknown classifier name 'foo'"
        );

        let error = GeolearnError::schema("attribute count mismatch");
        assert_eq!(error.to_string(), "Schema error: attribute count mismatch");

        let error = GeolearnError::source("boundary file not found");
        assert_eq!(error.to_string(), "Source error: boundary file not found");
    }

    #[test]
    fn test_per_record_classification() {
        assert!(GeolearnError::record("bad coordinate").is_per_record());
        assert!(GeolearnError::prediction("unseen value").is_per_record());
        assert!(!GeolearnError::schema("mismatch").is_per_record());
        assert!(!GeolearnError::config("bad rate").is_per_record());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = GeolearnError::from(io_error);
        assert!(matches!(error, GeolearnError::Io(_)));
    }
}
