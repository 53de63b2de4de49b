//! Errors shared by the calculators, the geometry editor and the results
//! file. They serialize as `{"type": ..., "details": {...}}` so the web API
//! can return them unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A submitted value is out of range or not a number
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unknown calculator: {slug}")]
    UnknownCalculator { slug: String },

    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Another writer holds the results file
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// The results file was written by an incompatible schema
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    pub fn unknown_calculator(slug: impl Into<String>) -> Self {
        CalcError::UnknownCalculator { slug: slug.into() }
    }

    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Retrying the same operation later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Caused by what the user submitted rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::UnknownCalculator { .. }
        )
    }

    /// Stable code returned alongside API errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("belt_speed", "0.0", "Belt speed must be at least 0.1 m/s");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        assert!(json.contains("\"details\":{\"field\":\"belt_speed\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CalcError::unknown_calculator("gearbox").to_string(),
            "Unknown calculator: gearbox"
        );
        assert_eq!(
            CalcError::missing_field("torque").to_string(),
            "Missing required field: torque"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("torque").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::unknown_calculator("gearbox").error_code(), "UNKNOWN_CALCULATOR");
    }

    #[test]
    fn test_error_classification() {
        assert!(CalcError::unknown_calculator("gearbox").is_client_error());
        assert!(CalcError::missing_field("power").is_client_error());
        assert!(!CalcError::serialization("bad json").is_client_error());
        assert!(CalcError::file_locked("results.json", "someone", "now").is_recoverable());
        assert!(!CalcError::file_error("read", "results.json", "denied").is_recoverable());
    }
}
