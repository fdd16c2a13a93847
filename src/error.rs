//! Error types and handling infrastructure for rwio.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library error type. The `rwio` binary layers `anyhow` on top for context.
//!
//! ## Design Principles
//!
//! - **Distinct failure classes**: a missing optional codec is never reported as a bad file
//! - **Context preservation**: every error names the path, and where relevant the codec or line
//! - **No swallowing**: I/O errors from the platform pass through with their source attached

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for rwio operations.
#[derive(Error, Debug)]
pub enum RwioError {
    /// File system related errors (permission denied, disk full, corrupt stream, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File or parent directory does not exist
    #[error("No such file or directory: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Unrecognized codec or file type name
    #[error("Unsupported format: {name} (valid options: {valid})")]
    UnsupportedFormat { name: String, valid: String },

    /// Operation not meaningful for the resolved codec or format
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    /// Optional support compiled out of this build
    #[error("Missing dependency: {feature} support is not available, rebuild rwio with the `{feature}` feature enabled")]
    MissingDependency { feature: &'static str },

    /// Content could not be decoded as the requested format
    #[error("Malformed data in {path}{}: {message}", location_suffix(.line, .column))]
    MalformedData {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    /// Invalid call arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Standard Result type for rwio operations.
pub type Result<T> = std::result::Result<T, RwioError>;

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

impl RwioError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Classify an io::Error raised while opening `path`
    pub fn open_failed(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::PathNotFound {
                path: path.to_path_buf(),
            },
            _ => Self::file_error(format!("Failed to open {}", path.display()), source),
        }
    }

    /// Create a MalformedData error without position information
    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        Self::MalformedData {
            path: path.to_path_buf(),
            line: None,
            column: None,
            message: message.into(),
        }
    }

    /// Create a MalformedData error pointing at a line and optional column
    pub fn malformed_at(
        path: &Path,
        line: usize,
        column: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedData {
            path: path.to_path_buf(),
            line: Some(line),
            column,
            message: message.into(),
        }
    }

    /// Create an UnsupportedOperation error with a descriptive message
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// Automatic conversion from io::Error to RwioError
impl From<std::io::Error> for RwioError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
