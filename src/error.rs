//! Error types and handling for Cellbench
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Cellbench operations
pub type Result<T> = std::result::Result<T, CellbenchError>;

/// Main error type for Cellbench
#[derive(Debug, Error)]
pub enum CellbenchError {
    /// A reading referenced a chemistry absent from the profile table
    #[error("Unknown chemistry: {chemistry}")]
    UnknownChemistry { chemistry: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl CellbenchError {
    /// Create a new unknown-chemistry error
    pub fn unknown_chemistry<S: Into<String>>(chemistry: S) -> Self {
        CellbenchError::UnknownChemistry {
            chemistry: chemistry.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        CellbenchError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        CellbenchError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        CellbenchError::Web {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        CellbenchError::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CellbenchError {
    fn from(err: std::io::Error) -> Self {
        CellbenchError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for CellbenchError {
    fn from(err: serde_yaml::Error) -> Self {
        CellbenchError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CellbenchError {
    fn from(err: serde_json::Error) -> Self {
        CellbenchError::Serialization {
            message: err.to_string(),
        }
    }
}
