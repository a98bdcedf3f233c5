//! Error handling for capture extraction.
//!
//! Per-file errors (access, missing fields, shape, timestamps) are recoverable:
//! the pipeline skips the file and carries on. Only directory-level failures
//! abort a run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MplError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Capture directory not found at path: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Cannot read capture file: {path} - {reason}")]
    FileAccess { path: PathBuf, reason: String },

    #[error("Missing field '{field}' in capture file: {path}")]
    MissingField { path: PathBuf, field: String },

    #[error("Malformed field '{field}' in capture file: {path} - {reason}")]
    MalformedShape {
        path: PathBuf,
        field: String,
        reason: String,
    },

    #[error("Invalid timestamp '{value}': {reason}")]
    TimestampParse { value: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, MplError>;

/// Class of a per-file failure, reported alongside the skipped file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    FileAccess,
    MissingField,
    MalformedShape,
    TimestampParse,
    Other,
}

impl MplError {
    /// Classify this error for per-file failure reporting
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            MplError::FileAccess { .. } | MplError::Io(_) => FailureKind::FileAccess,
            MplError::MissingField { .. } => FailureKind::MissingField,
            MplError::MalformedShape { .. } => FailureKind::MalformedShape,
            MplError::TimestampParse { .. } => FailureKind::TimestampParse,
            _ => FailureKind::Other,
        }
    }

    /// Attach the offending file to errors raised before the path was known
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            MplError::MalformedShape { field, reason, .. } => MplError::MalformedShape {
                path: path.into(),
                field,
                reason,
            },
            MplError::MissingField { field, .. } => MplError::MissingField {
                path: path.into(),
                field,
            },
            other => other,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::FileAccess => "file access",
            FailureKind::MissingField => "missing field",
            FailureKind::MalformedShape => "malformed shape",
            FailureKind::TimestampParse => "timestamp parse",
            FailureKind::Other => "other",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_classification() {
        let err = MplError::TimestampParse {
            value: "2024 12".to_string(),
            reason: "bad".to_string(),
        };
        assert_eq!(err.failure_kind(), FailureKind::TimestampParse);

        let err = MplError::MissingField {
            path: PathBuf::from("a.nc"),
            field: "aod".to_string(),
        };
        assert_eq!(err.failure_kind(), FailureKind::MissingField);

        let err = MplError::Configuration {
            message: "x".to_string(),
        };
        assert_eq!(err.failure_kind(), FailureKind::Other);
    }

    #[test]
    fn test_with_path_fills_unknown_path() {
        let err = MplError::MalformedShape {
            path: PathBuf::new(),
            field: "clouds".to_string(),
            reason: "expected 3 layers, found 2".to_string(),
        }
        .with_path("scan.nc");

        match err {
            MplError::MalformedShape { path, field, .. } => {
                assert_eq!(path, PathBuf::from("scan.nc"));
                assert_eq!(field, "clouds");
            }
            _ => panic!("Expected MalformedShape error"),
        }
    }
}
