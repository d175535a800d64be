use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    Unauthorized(String),
    ValidationError(String),
    UnsupportedFormat(String),
    InsufficientData(String),
    DatabaseError(String),
    IoError(String),
    Timeout(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Not authorized: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            AppError::InsufficientData(msg) => write!(f, "Insufficient data: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timed out: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

// A csv error is either a failed read on the underlying stream or a stream
// that does not decode as delimited rows.
impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io) => AppError::IoError(io.to_string()),
            _ => AppError::UnsupportedFormat(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON encoding failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_io_error_maps_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: AppError = csv::Error::from(io).into();
        assert!(matches!(err, AppError::IoError(_)));
    }

    #[test]
    fn test_display_prefixes_kind() {
        let err = AppError::UnsupportedFormat("missing header row".to_string());
        assert_eq!(err.to_string(), "Unsupported format: missing header row");
    }
}
